//! Admin gate in front of the tool.

/// What the auth provider knows about the signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUser {
    /// The user carries the admin flag.
    pub is_admin: bool,
}

/// Outcome of checking the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Nobody is signed in.
    SignedOut,
    /// Signed in without the admin flag.
    Denied,
    /// Signed-in admin; the tool is shown.
    Granted,
}

impl Access {
    /// Decide what to show for `user`.
    #[must_use]
    pub const fn evaluate(user: Option<&CurrentUser>) -> Self {
        match user {
            None => Self::SignedOut,
            Some(CurrentUser { is_admin: true }) => Self::Granted,
            Some(CurrentUser { is_admin: false }) => Self::Denied,
        }
    }

    /// `true` only for [`Access::Granted`].
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_get_in() {
        assert_eq!(Access::evaluate(None), Access::SignedOut);
        assert_eq!(
            Access::evaluate(Some(&CurrentUser { is_admin: false })),
            Access::Denied
        );
        assert!(Access::evaluate(Some(&CurrentUser { is_admin: true })).is_granted());
    }
}
