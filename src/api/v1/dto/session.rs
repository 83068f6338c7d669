/*
 * Responsibility
 * - Session (login) の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use serde::{Deserialize, Serialize};

const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.username.trim();
        if name.is_empty() {
            return Err("username is required");
        }
        if name.chars().count() > MAX_USERNAME_LEN {
            return Err("username must be <= 64 chars");
        }
        if name.chars().any(char::is_control) {
            return Err("username must not contain control characters");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
}
