use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Inbound deposit request after validation.
#[derive(Clone, Debug)]
pub struct DepositRequest {
    pub amount: Number,
    pub external_id: String,
    pub payer: Map<String, Value>,
}

impl DepositRequest {
    /// Extracts `amount`, `external_id` and `payer`. A field that is absent or
    /// `null` counts as missing; all missing fields are reported together.
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let field = |name: &str| body.get(name).filter(|v| !v.is_null());

        let (amount, external_id, payer) =
            match (field("amount"), field("external_id"), field("payer")) {
                (Some(a), Some(e), Some(p)) => (a, e, p),
                (a, e, p) => {
                    let missing: Vec<&str> = [("amount", a), ("external_id", e), ("payer", p)]
                        .into_iter()
                        .filter(|(_, v)| v.is_none())
                        .map(|(name, _)| name)
                        .collect();
                    return Err(format!("Missing required fields: {}", missing.join(", ")));
                }
            };

        let amount = match amount {
            Value::Number(n) => n.clone(),
            _ => return Err("Field 'amount' must be a number".to_string()),
        };
        let external_id = match external_id {
            Value::String(s) => s.clone(),
            _ => return Err("Field 'external_id' must be a string".to_string()),
        };
        let payer = match payer {
            Value::Object(o) => o.clone(),
            _ => return Err("Field 'payer' must be an object".to_string()),
        };

        Ok(Self {
            amount,
            external_id,
            payer,
        })
    }
}

#[derive(Serialize)]
pub struct ProviderDeposit<'a> {
    pub amount: &'a Number,
    pub external_id: &'a str,
    #[serde(rename = "clientCallbackUrl")]
    pub client_callback_url: &'a str,
    pub payer: &'a Map<String, Value>,
}

/// The four fields handed back to the caller. Anything else the provider
/// sends is dropped.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DepositResponse {
    #[serde(default)]
    pub transaction_id: Value,
    #[serde(default)]
    pub qr_code_image: Value,
    #[serde(default)]
    pub pix_code: Value,
    #[serde(default)]
    pub status: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderError {
    pub error: Option<Value>,
    pub message: Option<Value>,
}
