use aperture_auth::{Role, StaffId};

/// Principal context for a request (authenticated identity).
///
/// Carries the role from the token for logging only; gates reload the stored
/// role from the directory before deciding anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    staff_id: StaffId,
    token_role: Role,
}

impl PrincipalContext {
    pub fn new(staff_id: StaffId, token_role: Role) -> Self {
        Self { staff_id, token_role }
    }

    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    pub fn token_role(&self) -> &Role {
        &self.token_role
    }
}
