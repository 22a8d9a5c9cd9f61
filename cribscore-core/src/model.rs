use crate::alphabet::Alphabet;
use crate::context::Context;
use crate::counts::CountStore;
use crate::error::ConstructionError;
use crate::estimator::{code_length, Exclusions};
use crate::metadata::Metadata;
use std::io::{self, ErrorKind, Read};

const READ_CHUNK: usize = 64 * 1024;

/// Construction-time settings for a [`Model`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelOptions {
    /// Upper-case symbols and input before lookup.
    pub case_fold: bool,
    pub provenance: String,
    /// Counters are rescaled before any of them would pass this value.
    pub count_limit: u32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            case_fold: false,
            provenance: String::new(),
            count_limit: u32::MAX,
        }
    }
}

/// An order-4 PPM character model with a fixed-size count table.
///
/// Training needs exclusive access. Once trained, a model can be shared and
/// scored from any number of threads.
#[derive(Clone, Debug)]
pub struct Model {
    pub(crate) alphabet: Alphabet,
    pub(crate) counts: CountStore,
    pub(crate) metadata: Metadata,
}

impl Model {
    pub fn new(alphabet: &str, case_fold: bool) -> Result<Self, ConstructionError> {
        Self::with_options(
            alphabet,
            ModelOptions {
                case_fold,
                ..ModelOptions::default()
            },
        )
    }

    pub fn with_options(alphabet: &str, options: ModelOptions) -> Result<Self, ConstructionError> {
        let alphabet = Alphabet::new(alphabet, options.case_fold)?;
        let counts = CountStore::new(alphabet.bits(), options.count_limit)?;
        log::debug!(
            "new model: {} symbols, {} bits per symbol, {} counters",
            alphabet.len(),
            alphabet.bits(),
            counts.len()
        );
        Ok(Self {
            alphabet,
            counts,
            metadata: Metadata::new(options.provenance, options.case_fold),
        })
    }

    /// Trains on everything `reader` yields and returns the number of symbols
    /// learned. Bytes outside the alphabet are skipped and do not break the
    /// context. On an I/O error whatever was read so far stays trained.
    ///
    /// Input is taken byte by byte, i.e. as Latin-1. UTF-8 text with
    /// characters above U+007F should go through [`Model::train_text`], which
    /// reads characters the way [`Model::score`] does.
    pub fn train<R: Read>(&mut self, mut reader: R) -> io::Result<u64> {
        let mut buf = vec![0u8; READ_CHUNK];
        let mut ctx = Context::new(self.alphabet.bits());
        let mut trained = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let alphabet = &self.alphabet;
            let codes = buf[..n].iter().map(|&b| alphabet.encode(b));
            trained += train_codes(&mut self.counts, &mut self.metadata, &mut ctx, codes);
        }

        log::info!(
            "trained {} symbols ({} in total, {} rescales)",
            trained,
            self.metadata.symbols_trained,
            self.metadata.rescales
        );
        Ok(trained)
    }

    /// Same as [`Model::train`] over an in-memory buffer.
    pub fn train_bytes(&mut self, bytes: &[u8]) -> u64 {
        let mut ctx = Context::new(self.alphabet.bits());
        let alphabet = &self.alphabet;
        let codes = bytes.iter().map(|&b| alphabet.encode(b));
        train_codes(&mut self.counts, &mut self.metadata, &mut ctx, codes)
    }

    /// Trains on `text` character by character. Characters above U+00FF are
    /// out of the alphabet and skipped.
    pub fn train_text(&mut self, text: &str) -> u64 {
        let mut ctx = Context::new(self.alphabet.bits());
        let alphabet = &self.alphabet;
        let codes = text.chars().map(|c| alphabet.encode_char(c));
        train_codes(&mut self.counts, &mut self.metadata, &mut ctx, codes)
    }

    /// Total cost of `text` in nats. Lower means more probable.
    pub fn score(&self, text: &str) -> f64 {
        self.score_codes(text.chars().map(|c| self.alphabet.encode_char(c)))
    }

    pub fn score_bytes(&self, bytes: &[u8]) -> f64 {
        self.score_codes(bytes.iter().map(|&b| self.alphabet.encode(b)))
    }

    /// Average cost per character, so texts of different lengths compare.
    pub fn score_per_symbol(&self, text: &str) -> f64 {
        let n = text.chars().count();
        if n == 0 {
            return 0.0;
        }
        self.score(text) / n as f64
    }

    fn score_codes(&self, codes: impl Iterator<Item = u8>) -> f64 {
        let len = self.alphabet.len();
        let mut ctx = Context::new(self.alphabet.bits());
        let mut total = 0.0;
        for code in codes {
            let mut exclusions = Exclusions::new();
            total += code_length(&self.counts, len, &ctx, code, &mut exclusions);
            // Unknown characters go in as gaps.
            ctx.push(code);
        }
        total
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_provenance(&mut self, provenance: impl Into<String>) {
        self.metadata.provenance = provenance.into();
    }

    pub fn counts(&self) -> &CountStore {
        &self.counts
    }
}

fn train_codes(
    counts: &mut CountStore,
    metadata: &mut Metadata,
    ctx: &mut Context,
    codes: impl Iterator<Item = u8>,
) -> u64 {
    let mut trained = 0;
    for code in codes.filter(|&code| code != 0) {
        if counts.increment(ctx, code) {
            metadata.rescales += 1;
        }
        ctx.push(code);
        trained += 1;
    }
    metadata.symbols_trained += trained;
    trained
}
