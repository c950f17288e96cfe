/// The signed-in user, as reported by whatever holds the session.
///
/// The page only checks for presence before building the form; the token (when any) is handed
/// to the transport as a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub name: String,
    pub token: Option<String>,
}

impl CurrentUser {
    pub fn new(name: impl Into<String>, token: Option<String>) -> Self {
        Self {
            name: name.into(),
            token,
        }
    }
}
