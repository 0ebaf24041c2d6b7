use anyhow::{Context, Result};
use std::io::{Read, Write};

use crate::ecm::Ecm;

/// Writes a generation file: a `u32` generation count followed by every
/// generation in order, all bincode-encoded.
///
/// The count header lets readers allocate once and stream the body.
pub fn write_generations<W: Write>(mut writer: W, generations: &[Ecm]) -> Result<()> {
    let count = u32::try_from(generations.len()).context("Too many generations for a u32 header")?;
    bincode::serialize_into(&mut writer, &count).context("Failed to write generation count header")?;
    for (g, ecm) in generations.iter().enumerate() {
        bincode::serialize_into(&mut writer, ecm)
            .with_context(|| format!("Failed to serialize generation {}", g))?;
    }
    writer.flush().context("Failed to flush generation file")?;
    Ok(())
}

/// Reads back a file produced by [`write_generations`].
pub fn read_generations<R: Read>(mut reader: R) -> Result<Vec<Ecm>> {
    let count: u32 = bincode::deserialize_from(&mut reader)
        .context("Failed to read generation count from header")?;
    let mut generations = Vec::with_capacity(count as usize);
    for g in 0..count {
        let ecm: Ecm = bincode::deserialize_from(&mut reader)
            .with_context(|| format!("Failed to read generation {} of {}", g, count))?;
        generations.push(ecm);
    }
    Ok(generations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecm::{Cell, Fibre, MatrixProperties};
    use crate::vecmath::OrderedPair;

    fn generation(offset: f64) -> Ecm {
        Ecm::new(
            MatrixProperties { width: 300.0, stiffness: 0.9, cell_speed: 2.0 },
            vec![
                Fibre::new(74.0, 0.2, OrderedPair::new(1.0 + offset, 2.0), OrderedPair::new(0.6, 0.8)),
                Fibre::new(80.5, 0.2, OrderedPair::new(100.0, 50.0 + offset), OrderedPair::new(-1.0, 0.0)),
            ],
            vec![Cell::new(1, 15.0, 2.6, 50.0, 100.0, OrderedPair::new(40.0, 41.0 + offset), OrderedPair::new(0.0, 1.0))],
        )
    }

    #[test]
    fn generation_file_preserves_order_and_content() {
        let generations = vec![generation(0.0), generation(1.5), generation(3.0)];
        let mut buffer = Vec::new();
        write_generations(&mut buffer, &generations).unwrap();

        let restored = read_generations(buffer.as_slice()).unwrap();
        assert_eq!(restored, generations);
    }

    #[test]
    fn truncated_file_is_an_error() {
        let mut buffer = Vec::new();
        write_generations(&mut buffer, &[generation(0.0), generation(1.0)]).unwrap();
        buffer.truncate(buffer.len() - 8);
        assert!(read_generations(buffer.as_slice()).is_err());
    }
}
