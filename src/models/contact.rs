use serde::{ Deserialize, Serialize };

/// Contact details collected once per device and attached to webhook calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
}

impl ContactInfo {
    pub fn new(name: impl Into<String>, whatsapp: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            whatsapp: whatsapp.into(),
            email: email.into(),
        }
    }
}
