//! Element and attribute names of the FEL exemption certificate schema.

/// General document data: emission timestamp and DTE type.
pub const GENERAL_DATA: &str = "dte:DatosGenerales";
pub const EMISSION_TIMESTAMP: &str = "FechaHoraEmision";
pub const DOCUMENT_TYPE: &str = "Tipo";

/// Certification authorization; its text is the authorization number.
pub const AUTHORIZATION: &str = "dte:NumeroAutorizacion";
pub const SERIES: &str = "Serie";
pub const NUMBER: &str = "Numero";

/// Reference complement pointing at the affected invoice.
pub const REFERENCE: &str = "crc:ReferenciasConstancia";
pub const SOURCE_AUTHORIZATION: &str = "NumeroAutorizacionDocumentoOrigen";
pub const SOURCE_SERIES: &str = "SerieDocumentoOrigen";
pub const SOURCE_NUMBER: &str = "NumeroDocumentoOrigen";
pub const SOURCE_DATE: &str = "FechaEmisionDocumentoOrigen";

pub const TOTAL_TAX: &str = "dte:TotalImpuesto";
pub const TAX_AMOUNT: &str = "TotalMontoImpuesto";

/// Grand total; the amount is the element text.
pub const GRAND_TOTAL: &str = "dte:GranTotal";

/// Name reported when an element's text content is missing.
pub const TEXT_CONTENT: &str = "#text";

/// Separator between the date and time parts of a timestamp.
pub const DATE_TIME_SEPARATOR: char = 'T';
