/// Declares a closed set of labels stored as text in the database.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and `TryFrom<&str>`
/// (case-insensitive) plus serde using the same labels.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::EngineError;

            fn try_from(value: &str) -> Result<Self, $crate::EngineError> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| {
                        $crate::EngineError::Validation(format!(
                            "invalid {}: {value}",
                            stringify!($name)
                        ))
                    })
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::EngineError;

            fn from_str(s: &str) -> Result<Self, $crate::EngineError> {
                Self::try_from(s)
            }
        }
    };
}
