//! Saving and loading trained models.
//!
//! Layout, all integers little endian:
//!
//! ```text
//! magic "CRIB" | u16 version | u8 order | u8 case fold
//! u16 alphabet length | alphabet bytes
//! u32 count limit | u64 created | u32 provenance length | provenance bytes
//! u64 symbols trained | u64 rescales
//! u64 table length | u64 non-zero entries | (u64 index, u32 count)*
//! ```
//!
//! Only non-zero counters are stored, in ascending index order.

use crate::alphabet::Alphabet;
use crate::context::ORDER;
use crate::counts::CountStore;
use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::model::Model;
use std::io::{self, BufReader, BufWriter, Read, Write};

const MAGIC: [u8; 4] = *b"CRIB";
const VERSION: u16 = 1;

impl Model {
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = BufWriter::new(writer);
        w.write_all(&MAGIC)?;
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&[ORDER as u8, u8::from(self.alphabet.case_fold())])?;

        let symbols: Vec<u8> = self
            .alphabet
            .symbols()
            .chars()
            .map(|c| u32::from(c) as u8)
            .collect();
        w.write_all(&(symbols.len() as u16).to_le_bytes())?;
        w.write_all(&symbols)?;

        w.write_all(&self.counts.limit().to_le_bytes())?;
        w.write_all(&self.metadata.created.to_le_bytes())?;
        let provenance = self.metadata.provenance.as_bytes();
        let provenance_len = u32::try_from(provenance.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "provenance longer than 4 GiB")
        })?;
        w.write_all(&provenance_len.to_le_bytes())?;
        w.write_all(provenance)?;
        w.write_all(&self.metadata.symbols_trained.to_le_bytes())?;
        w.write_all(&self.metadata.rescales.to_le_bytes())?;

        let table = self.counts.raw();
        w.write_all(&(table.len() as u64).to_le_bytes())?;
        w.write_all(&(self.counts.nonzero() as u64).to_le_bytes())?;
        for (i, &v) in table.iter().enumerate().filter(|&(_, &v)| v != 0) {
            w.write_all(&(i as u64).to_le_bytes())?;
            w.write_all(&v.to_le_bytes())?;
        }

        w.flush()?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Model> {
        let mut r = BufReader::new(reader);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::BadMagic);
        }
        let version = read_u16(&mut r)?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        if usize::from(read_u8(&mut r)?) != ORDER {
            return Err(Error::Corrupt("model order mismatch"));
        }
        let case_fold = match read_u8(&mut r)? {
            0 => false,
            1 => true,
            _ => return Err(Error::Corrupt("bad case fold flag")),
        };

        let mut symbols = vec![0u8; usize::from(read_u16(&mut r)?)];
        r.read_exact(&mut symbols)?;
        let symbols: String = symbols.into_iter().map(char::from).collect();
        let alphabet = Alphabet::new(&symbols, case_fold)?;

        let limit = read_u32(&mut r)?;
        let created = read_u64(&mut r)?;
        let provenance_len = u64::from(read_u32(&mut r)?);
        // Grows with the data actually present, not the declared length.
        let mut provenance = Vec::new();
        (&mut r).take(provenance_len).read_to_end(&mut provenance)?;
        if provenance.len() as u64 != provenance_len {
            return Err(Error::Io(io::ErrorKind::UnexpectedEof.into()));
        }
        let provenance =
            String::from_utf8(provenance).map_err(|_| Error::Corrupt("provenance is not UTF-8"))?;
        let symbols_trained = read_u64(&mut r)?;
        let rescales = read_u64(&mut r)?;

        let mut counts = CountStore::new(alphabet.bits(), limit)?;
        if read_u64(&mut r)? != counts.len() as u64 {
            return Err(Error::Corrupt("count table size does not match the alphabet"));
        }
        let entries = read_u64(&mut r)?;
        if entries > counts.len() as u64 {
            return Err(Error::Corrupt("too many count entries"));
        }

        let table = counts.raw_mut();
        let mut next = 0u64;
        for _ in 0..entries {
            let index = read_u64(&mut r)?;
            let value = read_u32(&mut r)?;
            if index < next || index >= table.len() as u64 {
                return Err(Error::Corrupt("count index out of order"));
            }
            if value == 0 || value > limit {
                return Err(Error::Corrupt("count out of range"));
            }
            table[index as usize] = value;
            next = index + 1;
        }
        if !counts.is_consistent() {
            return Err(Error::Corrupt("parent totals do not match their children"));
        }

        log::debug!(
            "loaded model: {} symbols, {} trained, {} non-zero counters",
            alphabet.len(),
            symbols_trained,
            entries
        );

        Ok(Model {
            alphabet,
            counts,
            metadata: Metadata {
                created,
                provenance,
                symbols_trained,
                case_fold,
                rescales,
            },
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        self.save(&mut out)?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Model> {
        Model::load(bytes)
    }
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
}
