//! Closed sets of choices used by configuration fields.
//!
//! Every choice parses case-insensitively from its text form and renders back
//! to its canonical spelling, which is also its serialized form.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A value did not match any known choice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All choices in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownChoice {
                        kind: $kind,
                        value: wanted.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|choice| choice.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// How the connection authenticates against the cube.
    AuthMethod, "auth method" {
        /// Integrated Windows authentication; no stored password needed.
        Sspi => "SSPI",
        /// Explicit domain, username, and password from the credential vault.
        Login => "LOGIN",
    }
}

choice_enum! {
    /// Which file types an export produces.
    ExportFormat, "export format" {
        Xlsx => "xlsx",
        Csv => "csv",
        Both => "both",
    }
}

choice_enum! {
    /// Post-export packaging.
    Compression, "compression" {
        None => "none",
        Zip => "zip",
    }
}

choice_enum! {
    /// CSV quoting policy.
    CsvQuoting, "CSV quoting" {
        Minimal => "minimal",
        All => "all",
        NonNumeric => "nonnumeric",
        None => "none",
    }
}

impl ExportFormat {
    pub fn includes_xlsx(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }

    pub fn includes_csv(&self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

impl AuthMethod {
    /// Whether this method needs the password half of the credentials.
    pub fn requires_password(&self) -> bool {
        matches!(self, Self::Login)
    }
}
