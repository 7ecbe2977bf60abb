use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with wire-exact serde names + as_str + FromStr
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Tags are driven by the remote telephony pipeline; `Timeout` and
// `TimeoutWarning` are synthesized client-side by the poller.
str_enum!(CallState {
    Initiated => "initiated",
    Ringing => "ringing",
    InProgress => "in-progress",
    Verifying => "verifying",
    Ended => "ended",
    Error => "error",
    Timeout => "timeout",
    TimeoutWarning => "timeout_warning",
});

str_enum!(DocumentType {
    MedicalReport => "Medical Report",
    Prescription => "Prescription",
    LabResult => "Lab Result",
    VaccinationRecord => "Vaccination Record",
    InsuranceDocument => "Insurance Document",
    ConsultationNote => "Consultation Note",
    DischargeSummary => "Discharge Summary",
    MedicalBill => "Medical Bill",
    Other => "Other",
});

impl CallState {
    /// A terminal state stops polling permanently.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Error)
    }
}

impl DocumentType {
    /// Choice list offered by the upload form, in display order.
    pub const ALL: [DocumentType; 9] = [
        DocumentType::MedicalReport,
        DocumentType::Prescription,
        DocumentType::LabResult,
        DocumentType::VaccinationRecord,
        DocumentType::InsuranceDocument,
        DocumentType::ConsultationNote,
        DocumentType::DischargeSummary,
        DocumentType::MedicalBill,
        DocumentType::Other,
    ];
}
