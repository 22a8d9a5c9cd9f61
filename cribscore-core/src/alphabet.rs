use crate::error::ConstructionError;

/// Widest symbol the packed context can hold. Four of these must fit in a `u32`.
pub const MAX_BITS: u32 = 7;

/// Maps the caller's symbols onto dense codes `1..=len`. Code 0 means "not in
/// the alphabet" and is never assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: String,
    codes: [u8; 256],
    case_fold: bool,
    bits: u32,
}

impl Alphabet {
    pub fn new(symbols: &str, case_fold: bool) -> Result<Self, ConstructionError> {
        if symbols.is_empty() {
            return Err(ConstructionError::EmptyAlphabet);
        }

        let mut codes = [0u8; 256];
        let mut folded = String::with_capacity(symbols.len());
        for (position, symbol) in symbols.chars().enumerate() {
            let ordinal = u8::try_from(u32::from(symbol))
                .map_err(|_| ConstructionError::SymbolOutOfRange { symbol })?;
            let byte = if case_fold { fold(ordinal) } else { ordinal };
            if codes[byte as usize] != 0 {
                return Err(ConstructionError::DuplicateSymbol { symbol, position });
            }
            // Checked below: anything past 127 symbols is rejected before use.
            codes[byte as usize] = (position + 1).min(255) as u8;
            folded.push(char::from(byte));
        }

        let len = folded.chars().count();
        // One extra slot for the reserved code 0.
        let bits = (len + 1).next_power_of_two().trailing_zeros();
        if bits > MAX_BITS {
            return Err(ConstructionError::TooManySymbols { len });
        }

        Ok(Self {
            symbols: folded,
            codes,
            case_fold,
            bits,
        })
    }

    #[inline]
    pub fn encode(&self, byte: u8) -> u8 {
        let byte = if self.case_fold { fold(byte) } else { byte };
        self.codes[byte as usize]
    }

    #[inline]
    pub fn encode_char(&self, c: char) -> u8 {
        match u8::try_from(u32::from(c)) {
            Ok(byte) => self.encode(byte),
            Err(_) => 0,
        }
    }

    pub fn decode(&self, code: u8) -> Option<u8> {
        if code == 0 {
            return None;
        }
        self.symbols
            .chars()
            .nth(code as usize - 1)
            .map(|c| u32::from(c) as u8)
    }

    /// Number of real symbols.
    pub fn len(&self) -> usize {
        self.symbols.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `len + 1` rounded up to a power of two.
    pub fn size(&self) -> usize {
        1 << self.bits
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn case_fold(&self) -> bool {
        self.case_fold
    }

    /// The symbols in code order, after case folding.
    pub fn symbols(&self) -> &str {
        &self.symbols
    }
}

/// Upper-cases a Latin-1 byte. `ß` and `ÿ` have no single-byte upper case and
/// stay as they are; so does the division sign.
#[inline]
fn fold(byte: u8) -> u8 {
    match byte {
        b'a'..=b'z' | 0xe0..=0xf6 | 0xf8..=0xfe => byte - 0x20,
        _ => byte,
    }
}
