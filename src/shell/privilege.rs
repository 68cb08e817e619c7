//! Privilege flag, degraded mode and the sudo password counter

/// Wrong answers tolerated before the next submission is refused outright.
pub const MAX_FAILED_ATTEMPTS: u8 = 2;

/// Result of one password submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Granted,
    /// Wrong password; the prompt stays open.
    Retry,
    /// Counter was already at the cap. The challenge ends without privilege.
    Locked,
}

#[derive(Debug, Default, Clone)]
pub struct Privilege {
    privileged: bool,
    degraded: bool,
    failed_attempts: u8,
}

impl Privilege {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one submission against `expected`.
    ///
    /// The cap is checked before the password, so the third submission in a
    /// row is refused even when it is correct.
    pub fn check_password(&mut self, input: &str, expected: &str) -> Challenge {
        if self.failed_attempts >= MAX_FAILED_ATTEMPTS {
            self.failed_attempts = 0;
            tracing::info!("sudo locked out");
            return Challenge::Locked;
        }
        if input == expected {
            self.privileged = true;
            self.failed_attempts = 0;
            tracing::info!("sudo granted");
            Challenge::Granted
        } else {
            self.failed_attempts += 1;
            Challenge::Retry
        }
    }

    /// Enter bare mode. Returns `false` if it was already set.
    pub fn enter_degraded(&mut self) -> bool {
        if self.degraded {
            return false;
        }
        self.degraded = true;
        tracing::info!("entered bare mode");
        true
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_wrong_passwords_lock_out() {
        let mut p = Privilege::new();
        assert_eq!(p.check_password("a", "pw"), Challenge::Retry);
        assert_eq!(p.check_password("b", "pw"), Challenge::Retry);
        assert_eq!(p.failed_attempts(), 2);
        assert_eq!(p.check_password("c", "pw"), Challenge::Locked);
        assert_eq!(p.failed_attempts(), 0);
        assert!(!p.is_privileged());
    }

    #[test]
    fn test_correct_password_before_cap() {
        let mut p = Privilege::new();
        assert_eq!(p.check_password("a", "pw"), Challenge::Retry);
        assert_eq!(p.check_password("pw", "pw"), Challenge::Granted);
        assert!(p.is_privileged());
        assert_eq!(p.failed_attempts(), 0);
    }

    #[test]
    fn test_third_submission_refused_even_if_correct() {
        let mut p = Privilege::new();
        p.check_password("a", "pw");
        p.check_password("b", "pw");
        assert_eq!(p.check_password("pw", "pw"), Challenge::Locked);
        assert!(!p.is_privileged());
    }

    #[test]
    fn test_degraded_is_one_way() {
        let mut p = Privilege::new();
        assert!(p.enter_degraded());
        assert!(!p.enter_degraded());
        assert!(p.is_degraded());
    }
}
