//! The Rabbit-style stream cipher used for `.enc` files.
//!
//! Keys are 128 bits; shorter keys are zero-padded and longer ones truncated.
//! Every call to [`Rabbit::apply_keystream`] starts on a fresh 16-byte block,
//! so splitting a message over several calls gives a different stream than
//! one call over the whole message.

const KEY_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const COUNTER_STEP: u32 = 0x4D34_D34D;

#[derive(Clone)]
pub struct Rabbit {
    key: [u8; KEY_LEN],
    x: [u32; 8],
    c: [u32; 8],
    carry: u32,
}

impl std::fmt::Debug for Rabbit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rabbit").finish_non_exhaustive()
    }
}

impl Rabbit {
    pub fn new(key: &[u8]) -> Self {
        let mut padded = [0u8; KEY_LEN];
        let len = key.len().min(KEY_LEN);
        padded[..len].copy_from_slice(&key[..len]);

        let mut cipher = Self {
            key: padded,
            x: [0; 8],
            c: [0; 8],
            carry: 0,
        };
        cipher.key_setup();
        cipher
    }

    /// Back to the state right after key setup.
    pub fn reset(&mut self) {
        self.x = [0; 8];
        self.c = [0; 8];
        self.carry = 0;
        self.key_setup();
    }

    fn key_setup(&mut self) {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(self.key.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let mut subkeys = [0u32; 8];
        for (i, subkey) in subkeys.iter_mut().enumerate() {
            *subkey = if i % 2 == 0 { words[i / 2] } else { words[(i / 2 + 1) % 4] };
        }
        self.x = subkeys;
        self.c = std::array::from_fn(|i| subkeys[(i + 1) % 8]);

        for _ in 0..4 {
            self.next_state();
        }
    }

    fn next_state(&mut self) {
        // the carry runs across counters and across calls
        for c in &mut self.c {
            let sum = u64::from(*c) + u64::from(COUNTER_STEP) + u64::from(self.carry);
            self.carry = (sum >> 32) as u32;
            *c = sum as u32;
        }

        let g: [u32; 8] = std::array::from_fn(|i| g_func(self.x[i].wrapping_add(self.c[i])));

        let x = &mut self.x;
        x[0] = g[0].wrapping_add(g[7].rotate_left(16)).wrapping_add(g[6].rotate_left(16));
        x[1] = g[1].wrapping_add(g[0].rotate_left(8)).wrapping_add(g[7]);
        x[2] = g[2].wrapping_add(g[1].rotate_left(16)).wrapping_add(g[0].rotate_left(16));
        x[3] = g[3].wrapping_add(g[2].rotate_left(8)).wrapping_add(g[1]);
        x[4] = g[4].wrapping_add(g[3].rotate_left(16)).wrapping_add(g[2].rotate_left(16));
        x[5] = g[5].wrapping_add(g[4].rotate_left(8)).wrapping_add(g[3]);
        x[6] = g[6].wrapping_add(g[5].rotate_left(16)).wrapping_add(g[4].rotate_left(16));
        x[7] = g[7].wrapping_add(g[6].rotate_left(8)).wrapping_add(g[5]);
    }

    fn extract(&self) -> [u8; BLOCK_LEN] {
        let x = &self.x;
        let words = [
            x[0] ^ (x[5] >> 16) ^ (x[3] << 16),
            x[2] ^ (x[7] >> 16) ^ (x[5] << 16),
            x[4] ^ (x[1] >> 16) ^ (x[7] << 16),
            x[6] ^ (x[3] >> 16) ^ (x[1] << 16),
        ];
        let mut block = [0u8; BLOCK_LEN];
        for (out, word) in block.chunks_exact_mut(4).zip(words) {
            out.copy_from_slice(&word.to_le_bytes());
        }
        block
    }

    /// XORs the keystream into `data`. Encryption and decryption are the same
    /// operation.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for chunk in data.chunks_mut(BLOCK_LEN) {
            self.next_state();
            let keystream = self.extract();
            for (byte, key) in chunk.iter_mut().zip(keystream) {
                *byte ^= key;
            }
        }
    }
}

fn g_func(x: u32) -> u32 {
    let square = u64::from(x) * u64::from(x);
    (square ^ (square >> 32)) as u32
}
