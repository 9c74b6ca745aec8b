//! Column names of every source spreadsheet and of the two reports.

// SICS ledger
pub const SICS_POLICY: &str = "Póliza";
pub const SICS_VALID_UNTIL: &str = "Vig Hasta Póliza";
pub const SICS_PERIOD_END: &str = "Fin Vig";

// SharePoint renewal tracker
pub const SHAREPOINT_POLICY: &str = "Pólizafinal";
pub const SHAREPOINT_STATUS: &str = "STATUS RENOVACION";

// Derived key columns added to SICS and SharePoint during preparation
pub const KEY_PACIFICO: &str = "Pacifico";
pub const KEY_RIMAC: &str = "Rimac";

// Rimac ledger
pub const RIMAC_PAYER: &str = "RESPONSABLE DE PAGO";
pub const RIMAC_POLICY: &str = "NRO. POLIZA";
pub const RIMAC_CATEGORY: &str = "CATEGORÍA";
pub const RIMAC_DUE: &str = "VENCIMIENTO";

// Pacífico ledger (and cancellation ledger)
pub const PAC_CONTRACTANT: &str = "Contratante";
pub const PAC_DOCUMENT: &str = "Nro de Documento";
pub const PAC_LINE: &str = "Linea de Negocio";
pub const PAC_PRODUCT: &str = "Producto";
pub const PAC_POLICY: &str = "Nro de Poliza/Contrato";
pub const PAC_START: &str = "Inicio de Vigencia";
pub const PAC_END: &str = "Fin de Vigencia";
pub const PAC_SITUATION: &str = "Situacion";
pub const PAC_PREMIUM_USD: &str = "Prima Bruta Dolares";
pub const PAC_PREMIUM_PEN: &str = "Prima Bruta Soles";
pub const PAC_REPORT_KIND: &str = "TipoReporte";

// Derived report columns
pub const OUT_SICS: &str = "SICS";
pub const OUT_TRACKER: &str = "Tablero";
pub const OUT_REMARKS: &str = "Observaciones";
pub const OUT_OWNER: &str = "Responsable";
pub const OUT_RIMAC_CODE: &str = "Obs";
pub const OUT_PACIFICO_CODE: &str = "OBS";
pub const OUT_WINDOW: &str = "DentroRango";
pub const OUT_CANCELLED: &str = "Polizas Anulada";

pub const SICS_REQUIRED_RIMAC: &[&str] = &[KEY_RIMAC, SICS_PERIOD_END];
pub const SICS_REQUIRED_PACIFICO: &[&str] = &[KEY_PACIFICO, SICS_PERIOD_END];
pub const SHAREPOINT_REQUIRED_RIMAC: &[&str] = &[KEY_RIMAC, SHAREPOINT_STATUS];
pub const SHAREPOINT_REQUIRED_PACIFICO: &[&str] = &[KEY_PACIFICO, SHAREPOINT_STATUS];

pub const RIMAC_REQUIRED: &[&str] = &[RIMAC_PAYER, RIMAC_POLICY, RIMAC_CATEGORY, RIMAC_DUE];

pub const PACIFICO_REQUIRED: &[&str] = &[
    PAC_CONTRACTANT,
    PAC_DOCUMENT,
    PAC_LINE,
    PAC_PRODUCT,
    PAC_POLICY,
    PAC_END,
    PAC_SITUATION,
];

pub const RIMAC_OUTPUT: &[&str] = &[
    RIMAC_PAYER,
    RIMAC_POLICY,
    RIMAC_CATEGORY,
    RIMAC_DUE,
    OUT_SICS,
    OUT_TRACKER,
    OUT_REMARKS,
    OUT_OWNER,
    OUT_RIMAC_CODE,
    OUT_WINDOW,
];

pub const PACIFICO_OUTPUT: &[&str] = &[
    PAC_CONTRACTANT,
    PAC_DOCUMENT,
    PAC_LINE,
    PAC_PRODUCT,
    PAC_POLICY,
    OUT_SICS,
    OUT_TRACKER,
    OUT_REMARKS,
    OUT_OWNER,
    PAC_END,
    OUT_PACIFICO_CODE,
    OUT_WINDOW,
    OUT_CANCELLED,
];
