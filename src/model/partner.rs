use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A referring agent who originates cases and earns commission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub source: Option<String>,
    pub partner_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub source: Option<String>,
}

impl Partner {
    pub fn new(input: NewPartner, now: DateTime<Utc>) -> Self {
        let partner_ref = partner_ref(&input.name, &input.phone_number);
        Self {
            id: String::new(),
            name: input.name,
            email: input.email,
            phone_number: input.phone_number,
            source: input.source,
            partner_ref,
            created_at: now,
        }
    }
}

/// Derive a partner reference: first four letters of the name followed by
/// the last four digits of the phone number, upper-cased.
///
/// Non-letters in the name and non-digits in the phone are skipped; shorter
/// inputs contribute whatever they have.
pub fn partner_ref(name: &str, phone: &str) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(4)
        .flat_map(|c| c.to_uppercase())
        .collect();

    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();

    format!("{letters}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_reference_from_name_and_phone() {
        assert_eq!(partner_ref("John", "9998887766"), "JOHN7766");
        assert_eq!(partner_ref("Priyanka Shah", "+91 99988-87766"), "PRIY7766");
    }

    #[test]
    fn short_inputs_use_what_is_present() {
        assert_eq!(partner_ref("Al", "12"), "AL12");
        assert_eq!(partner_ref("O'Neil", "555"), "ONEI555");
        assert_eq!(partner_ref("", ""), "");
    }

    #[test]
    fn new_partner_stamps_reference() {
        let partner = Partner::new(
            NewPartner {
                name: "john".into(),
                email: "john@example.com".into(),
                phone_number: "9998887766".into(),
                source: Some("referral".into()),
            },
            Utc::now(),
        );
        assert_eq!(partner.partner_ref, "JOHN7766");
    }

    proptest! {
        #[test]
        fn reference_is_deterministic(name in "[A-Za-z ]{0,12}", phone in "[0-9]{0,12}") {
            prop_assert_eq!(partner_ref(&name, &phone), partner_ref(&name, &phone));
        }

        #[test]
        fn reference_is_letters_then_digits(name in "\\PC{0,20}", phone in "\\PC{0,20}") {
            let letters = partner_ref(&name, "");
            let r = partner_ref(&name, &phone);
            prop_assert!(r.starts_with(&letters));
            prop_assert!(r[letters.len()..].chars().all(|c| c.is_ascii_digit()));
            prop_assert!(r[letters.len()..].len() <= 4);
        }
    }
}
