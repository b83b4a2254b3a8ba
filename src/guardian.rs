use crate::models::User;

/// Who is looking at the serialized output. `None` is an anonymous visitor.
#[derive(Debug, Clone, Default)]
pub struct Guardian {
    user: Option<User>,
}

impl Guardian {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    #[inline]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.user.is_none()
    }

    #[inline]
    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_staff)
    }
}

impl From<User> for Guardian {
    fn from(user: User) -> Self {
        Self::new(Some(user))
    }
}
