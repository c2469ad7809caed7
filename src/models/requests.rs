//! Request DTOs for the demo API

use serde::Deserialize;

/// Upper bound on ids accepted by one `GET /users` call.
pub const MAX_IDS_PER_REQUEST: usize = 256;

/// Query string of `GET /users?ids=1,2,1`
#[derive(Debug, Clone, Deserialize)]
pub struct UsersQuery {
    /// Comma-separated user ids; duplicates are allowed
    #[serde(default)]
    pub ids: String,
}

impl UsersQuery {
    /// Parses `ids` in request order, duplicates included.
    ///
    /// Returns an error message if the list is empty, too long, or holds a
    /// token that is not an unsigned integer.
    pub fn parse_ids(&self) -> Result<Vec<u64>, String> {
        let ids = self
            .ids
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid id '{}'", token))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err("At least one id is required".to_string());
        }
        if ids.len() > MAX_IDS_PER_REQUEST {
            return Err(format!(
                "Too many ids: {} (maximum {})",
                ids.len(),
                MAX_IDS_PER_REQUEST
            ));
        }
        Ok(ids)
    }
}
