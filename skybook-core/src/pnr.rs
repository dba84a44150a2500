use rand::Rng;

/// Booking-reference generator. Candidates are checked against the store
/// for uniqueness by the caller; implementations only need to produce
/// well-formed references with enough entropy that retries are rare.
pub trait PnrGenerator: Send + Sync {
    fn generate(&self) -> String;
}

const PNR_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const PNR_LEN: usize = 6;

/// Random 6-character reference over an airline-style alphabet
/// (no 0/O or 1/I).
pub struct RandomPnr;

impl PnrGenerator for RandomPnr {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..PNR_LEN)
            .map(|_| PNR_ALPHABET[rng.gen_range(0..PNR_ALPHABET.len())] as char)
            .collect()
    }
}
