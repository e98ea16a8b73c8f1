/// Allow-set of owner logins whose repositories are reported.
///
/// Built once at startup from the configured organizations plus, unless
/// suppressed, the token's own login. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    owners: Vec<String>,
}

impl OwnerFilter {
    pub fn new(orgs: Vec<String>, user: Option<String>) -> Self {
        let mut owners = orgs;
        if let Some(user) = user {
            if !owners.contains(&user) {
                owners.push(user);
            }
        }
        Self { owners }
    }

    pub fn allowed(&self, owner_login: &str) -> bool {
        self.owners.iter().any(|owner| owner == owner_login)
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }
}
