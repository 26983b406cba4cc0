use std::fmt;

/// Wallet name and password that unlocked staking for that wallet
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    wallet_name: String,
    password: String,
}

impl Credential {
    pub fn new(wallet_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self { wallet_name: wallet_name.into(), password: password.into() }
    }

    pub fn wallet_name(&self) -> &str {
        &self.wallet_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("wallet_name", &self.wallet_name).field("password", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_password() {
        let credential = Credential::new("main", "hunter2");
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("main"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(credential.password(), "hunter2");
    }
}
