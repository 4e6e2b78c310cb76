use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SEGMENTS: usize = 4;
const SEGMENT_LEN: usize = 4;

/// Random code in `XXXX XXXX XXXX XXXX` form
pub fn generate_sync_code() -> String {
    generate_with(&mut rand::thread_rng())
}

fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEGMENTS)
        .map(|_| {
            (0..SEGMENT_LEN)
                .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_well_formed(code: &str) -> bool {
    let segments = code.split(' ').collect::<Vec<_>>();
    segments.len() == SEGMENTS
        && segments.iter().all(|segment| {
            segment.len() == SEGMENT_LEN && segment.bytes().all(|byte| CHARSET.contains(&byte))
        })
}
