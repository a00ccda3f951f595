use serde::{Deserialize, Deserializer, Serialize};

/// Rejects negative amounts while decoding a payload.
fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "amount must be a non-negative number, got {value}"
        )))
    }
}

fn optional_non_negative<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(serde::de::Error::custom(
            format!("deduction must be a non-negative number, got {value}"),
        )),
        other => Ok(other),
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TransactionStatus {
        Successful,
        Rejected,
    }

    impl TransactionStatus {
        /// Human label shown on the dashboard and matched by search.
        pub fn label(self) -> &'static str {
            match self {
                Self::Successful => "Cobro exitoso",
                Self::Rejected => "Cobro no realizado",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PaymentMethod {
        Card,
        Pse,
        Daviplata,
        Nequi,
        Bancolombia,
    }

    impl PaymentMethod {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Card => "CARD",
                Self::Pse => "PSE",
                Self::Daviplata => "DAVIPLATA",
                Self::Nequi => "NEQUI",
                Self::Bancolombia => "BANCOLOMBIA",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::Card => "Tarjeta",
                Self::Pse => "PSE",
                Self::Daviplata => "Daviplata",
                Self::Nequi => "Nequi",
                Self::Bancolombia => "Bancolombia",
            }
        }
    }

    /// Channel through which a transaction occurred.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum SalesType {
        Terminal,
        PaymentLink,
    }

    impl SalesType {
        pub fn label(self) -> &'static str {
            match self {
                Self::Terminal => "Datáfono",
                Self::PaymentLink => "Link de pago",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum CardFranchise {
        Visa,
        Mastercard,
        AmericanExpress,
    }

    impl CardFranchise {
        pub fn label(self) -> &'static str {
            match self {
                Self::Visa => "Visa",
                Self::Mastercard => "Mastercard",
                Self::AmericanExpress => "American Express",
            }
        }
    }

    /// One payment event as returned by the API.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub id: String,
        pub status: TransactionStatus,
        pub payment_method: PaymentMethod,
        pub sales_type: SalesType,
        /// Epoch milliseconds.
        pub created_at: i64,
        pub transaction_reference: i64,
        /// Currency units (pesos), never negative.
        #[serde(deserialize_with = "non_negative")]
        pub amount: f64,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "optional_non_negative"
        )]
        pub deduction: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub franchise: Option<CardFranchise>,
    }

    impl Transaction {
        pub fn is_successful(&self) -> bool {
            self.status == TransactionStatus::Successful
        }

        pub fn has_deduction(&self) -> bool {
            self.deduction.is_some_and(|deduction| deduction > 0.0)
        }

        /// Amount left after the deduction, if any.
        pub fn net_amount(&self) -> f64 {
            self.amount - self.deduction.unwrap_or(0.0)
        }
    }

    /// Envelope of `GET {base_url}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub data: Vec<Transaction>,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;

    const SAMPLE: &str = r#"{
        "id": "GZEN23784UBV2",
        "status": "SUCCESSFUL",
        "paymentMethod": "CARD",
        "salesType": "PAYMENT_LINK",
        "createdAt": 1727740800000,
        "transactionReference": 7210,
        "amount": 843281,
        "deduction": 1500,
        "franchise": "AMERICAN_EXPRESS"
    }"#;

    #[test]
    fn decodes_camel_case_payload() {
        let tx: Transaction = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(tx.id, "GZEN23784UBV2");
        assert_eq!(tx.status, TransactionStatus::Successful);
        assert_eq!(tx.payment_method, PaymentMethod::Card);
        assert_eq!(tx.sales_type, SalesType::PaymentLink);
        assert_eq!(tx.created_at, 1_727_740_800_000);
        assert_eq!(tx.transaction_reference, 7210);
        assert_eq!(tx.amount, 843_281.0);
        assert_eq!(tx.deduction, Some(1500.0));
        assert_eq!(tx.franchise, Some(CardFranchise::AmericanExpress));
        assert!(tx.has_deduction());
        assert_eq!(tx.net_amount(), 841_781.0);
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let payload = r#"{"data":[{
            "id": "a",
            "status": "REJECTED",
            "paymentMethod": "NEQUI",
            "salesType": "TERMINAL",
            "createdAt": 0,
            "transactionReference": 1,
            "amount": 10.5
        }]}"#;
        let res: TransactionsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(res.data.len(), 1);
        assert_eq!(res.data[0].deduction, None);
        assert_eq!(res.data[0].franchise, None);
        assert!(!res.data[0].has_deduction());
        assert!(!res.data[0].is_successful());
    }

    #[test]
    fn rejects_negative_amount() {
        let payload = SAMPLE.replace("843281", "-1");
        assert!(serde_json::from_str::<Transaction>(&payload).is_err());
    }

    #[test]
    fn rejects_negative_deduction() {
        let payload = SAMPLE.replace("1500", "-1500");
        assert!(serde_json::from_str::<Transaction>(&payload).is_err());
    }

    #[test]
    fn rejects_unknown_status() {
        let payload = SAMPLE.replace("SUCCESSFUL", "PENDING");
        assert!(serde_json::from_str::<Transaction>(&payload).is_err());
    }

    #[test]
    fn status_labels() {
        assert_eq!(TransactionStatus::Successful.label(), "Cobro exitoso");
        assert_eq!(TransactionStatus::Rejected.label(), "Cobro no realizado");
    }
}
