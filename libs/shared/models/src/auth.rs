use serde::{Deserialize, Serialize};

use crate::lenient;

/// Logged-in customer as the browser stored it after OTP login.
///
/// The booking flow receives this value at construction; nothing in the
/// core reads it from ambient storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

impl CustomerIdentity {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            phone: phone.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_customer_id_is_accepted() {
        let customer: CustomerIdentity = serde_json::from_value(json!({
            "id": 42,
            "full_name": "Hodan Abdi",
            "phone": "252615000000"
        }))
        .unwrap();

        assert_eq!(customer.id, "42");
        assert_eq!(customer.full_name, "Hodan Abdi");
    }
}
