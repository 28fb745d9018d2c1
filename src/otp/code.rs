use rand::Rng;

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Produces the numeric code mailed to the user.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> u32;
}

/// Uniform draw over `CODE_MIN..=CODE_MAX`.
///
/// This is an anti-automation speed bump, not a secret; `thread_rng` is enough.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCode;

impl CodeGenerator for RandomCode {
    fn generate(&self) -> u32 {
        rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX)
    }
}

/// Always returns the same code.
#[derive(Clone, Copy, Debug)]
pub struct FixedCode(pub u32);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> u32 {
        self.0
    }
}
