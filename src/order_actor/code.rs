//! Human-shareable order codes of the form `4e-NNNN`.

use rand::Rng;

pub const CODE_PREFIX: &str = "4e-";
pub const CODE_MIN: u16 = 1000;
pub const CODE_MAX: u16 = 9999;

/// Random draws tried before falling back to a scan for the first free code.
const RANDOM_ATTEMPTS: usize = 32;

pub fn format_code(number: u16) -> String {
    format!("{CODE_PREFIX}{number}")
}

/// Checks the `4e-` prefix followed by a number in `1000..=9999`.
pub fn is_valid_code(code: &str) -> bool {
    code.strip_prefix(CODE_PREFIX)
        .filter(|digits| digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u16>().ok())
        .is_some_and(|n| (CODE_MIN..=CODE_MAX).contains(&n))
}

/// Produces order codes that are unique within the store.
///
/// Codes are drawn at random so they are not guessable in sequence. A draw that
/// collides with an assigned code is retried; once the random budget is spent
/// the free codes are scanned in order, so generation only fails when every
/// code is taken.
pub struct OrderCodeGenerator {
    draw: Box<dyn FnMut() -> u16 + Send>,
}

impl OrderCodeGenerator {
    pub fn random() -> Self {
        Self::from_fn(|| rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX))
    }

    /// Uses a caller-supplied number source. Out-of-range numbers count as collisions.
    pub fn from_fn(draw: impl FnMut() -> u16 + Send + 'static) -> Self {
        Self { draw: Box::new(draw) }
    }

    pub fn next_code(&mut self, is_taken: impl Fn(&str) -> bool) -> Option<String> {
        for _ in 0..RANDOM_ATTEMPTS {
            let number = (self.draw)();
            if !(CODE_MIN..=CODE_MAX).contains(&number) {
                continue;
            }
            let code = format_code(number);
            if !is_taken(&code) {
                return Some(code);
            }
            tracing::debug!(%code, "Order code collision, drawing again");
        }
        (CODE_MIN..=CODE_MAX)
            .map(format_code)
            .find(|code| !is_taken(code))
    }
}

impl std::fmt::Debug for OrderCodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderCodeGenerator").finish_non_exhaustive()
    }
}
