//! Sign-in commands.

use std::io::Write;

use secrecy::SecretString;

use canteen_storefront::Session;

pub fn login(
    session: &mut Session,
    email: &str,
    password: String,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = session.auth.login(email, &SecretString::from(password))?;
    writeln!(out, "Welcome back, {}!", user.display_name())?;
    Ok(())
}

pub fn signup(
    session: &mut Session,
    email: &str,
    password: String,
    name: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = session
        .auth
        .signup(email, &SecretString::from(password), name)?;
    writeln!(out, "Account created for {}", user.display_name())?;
    Ok(())
}

pub fn logout(session: &mut Session, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    session.auth.logout()?;
    writeln!(out, "Signed out")?;
    Ok(())
}

pub fn whoami(session: &Session, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    match session.auth.current_user() {
        Some(user) => writeln!(out, "{} <{}>", user.display_name(), user.email)?,
        None => writeln!(out, "Not signed in")?,
    }
    Ok(())
}
