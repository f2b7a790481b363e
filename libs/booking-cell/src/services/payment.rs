use serde::Serialize;

use crate::services::pricing::format_amount;

/// Mobile-money channels the customer pays through before confirming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Merchant,
    EDahab,
    Evc,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Merchant, PaymentMethod::EDahab, PaymentMethod::Evc];

    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Merchant => "Merchant",
            PaymentMethod::EDahab => "E-Dahab",
            PaymentMethod::Evc => "EVC",
        }
    }

    pub fn merchant_number(&self) -> &'static str {
        match self {
            PaymentMethod::Merchant => "737721",
            PaymentMethod::EDahab => "622222154",
            PaymentMethod::Evc => "0619002269",
        }
    }

    fn ussd_prefix(&self) -> &'static str {
        match self {
            PaymentMethod::Merchant => "*789*",
            PaymentMethod::EDahab => "*110*",
            PaymentMethod::Evc => "*712*",
        }
    }

    /// Dial string, e.g. `*712*0619002269*10#`. Unknown price dials `0`.
    pub fn ussd_code(&self, price: Option<f64>) -> String {
        let amount = price.map(format_amount).unwrap_or_else(|| "0".to_string());
        format!("{}{}*{}#", self.ussd_prefix(), self.merchant_number(), amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOption {
    pub method: PaymentMethod,
    pub name: String,
    pub merchant_number: String,
    pub ussd_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInstructions {
    pub amount: Option<f64>,
    pub options: Vec<PaymentOption>,
}

impl PaymentInstructions {
    pub fn for_price(price: Option<f64>) -> Self {
        Self {
            amount: price,
            options: PaymentMethod::ALL
                .iter()
                .map(|m| PaymentOption {
                    method: *m,
                    name: m.name().to_string(),
                    merchant_number: m.merchant_number().to_string(),
                    ussd_code: m.ussd_code(price),
                })
                .collect(),
        }
    }
}
