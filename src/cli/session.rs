use crate::error::{HearthError, Result};
use crate::settings::{clear_session, save_session, Session};

pub fn login(token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(HearthError::Validation("Token cannot be empty".to_string()));
    }
    save_session(&Session::with_token(token))?;
    println!("Token saved.");
    Ok(())
}

pub fn logout() -> Result<()> {
    if clear_session()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
