use serde::{Deserialize, Serialize};
use crate::auth::credentials::CredentialDigest;
use crate::types::balance::Balance;
use crate::types::ids::UserId;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub balance: Balance,
    pub credential: Option<CredentialDigest>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn new(user_id: UserId, credential: Option<CredentialDigest>) -> Self {
        let now = Timestamp::now();
        Account {
            user_id,
            balance: Balance::zero(),
            credential,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this account carrying a settled balance.
    pub fn with_balance(&self, balance: Balance) -> Self {
        Account {
            balance,
            updated_at: Timestamp::now(),
            ..self.clone()
        }
    }
}
