/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Opaque session token generation and validation
/// - [`middleware`]: Authentication context carried through requests
/// - [`policy`]: Pure access-policy decision functions
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: Random opaque tokens, stored as SHA-256 digests,
///   revocable by deleting the stored row
/// - **Constant-time Comparison**: Token verification never short-circuits
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::token::generate_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (plaintext, digest) = generate_token();
/// assert!(plaintext.starts_with("deck_"));
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;
