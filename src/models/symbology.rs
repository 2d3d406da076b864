use serde::{Deserialize, Serialize};

/// Barcode symbologies the detection engine can be told to recognise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Symbology {
    Ean13Upca,
    Ean8,
    Upce,
    Qr,
    DataMatrix,
    Code11,
    Code25,
    Code32,
    Code39,
    Code93,
    Code128,
    Aruco,
    Upu4State,
}

impl Symbology {
    /// The broad set enabled when no explicit vocabulary is configured.
    ///
    /// Every extra symbology costs recognition time, so deployments should
    /// narrow this to what they actually scan.
    pub fn generous_defaults() -> Vec<Symbology> {
        vec![
            Symbology::Ean13Upca,
            Symbology::Ean8,
            Symbology::Upce,
            Symbology::Qr,
            Symbology::DataMatrix,
            Symbology::Code39,
            Symbology::Code128,
            Symbology::Aruco,
            Symbology::Code11,
            Symbology::Code25,
            Symbology::Code32,
            Symbology::Code93,
            Symbology::Upu4State,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Ean13Upca => "ean13Upca",
            Symbology::Ean8 => "ean8",
            Symbology::Upce => "upce",
            Symbology::Qr => "qr",
            Symbology::DataMatrix => "dataMatrix",
            Symbology::Code11 => "code11",
            Symbology::Code25 => "code25",
            Symbology::Code32 => "code32",
            Symbology::Code39 => "code39",
            Symbology::Code93 => "code93",
            Symbology::Code128 => "code128",
            Symbology::Aruco => "aruco",
            Symbology::Upu4State => "upu4State",
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
