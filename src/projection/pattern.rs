//! Gray code pattern sequences.

/// Direction of the projected stripes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternDirection {
    /// Horizontal stripes, encode the projector row.
    Horizontal,
    /// Vertical stripes, encode the projector column.
    Vertical,
}

/// One frame of the projected sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFrame {
    /// Full-on reference.
    White,
    /// Full-off reference.
    Black,
    /// One Gray code bit plane.
    Bit {
        direction: PatternDirection,
        /// Bit plane, 0 is the most significant.
        bit: u32,
        inverted: bool,
    },
}

/// Convert binary value to Gray code.
pub fn binary_to_gray(binary: u32) -> u32 {
    binary ^ (binary >> 1)
}

/// Convert Gray code back to binary.
pub fn gray_to_binary(gray: u32) -> u32 {
    let mut binary = gray;
    let mut shift = 1;
    while shift < 32 {
        binary ^= binary >> shift;
        shift <<= 1;
    }
    binary
}

fn bits_for(extent: u32) -> u32 {
    if extent <= 1 {
        0
    } else {
        32 - (extent - 1).leading_zeros()
    }
}

/// Structured light pattern projection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternProjection {
    /// Projector width in pixels.
    pub projector_width: u32,
    /// Projector height in pixels.
    pub projector_height: u32,
    /// Bit planes encoding columns.
    pub column_bits: u32,
    /// Bit planes encoding rows.
    pub row_bits: u32,
    /// Project an inverted frame after every bit plane.
    pub inverted: bool,
    /// Project white/black reference frames first.
    pub references: bool,
}

impl PatternProjection {
    pub fn new(projector_width: u32, projector_height: u32) -> Self {
        Self {
            projector_width,
            projector_height,
            column_bits: bits_for(projector_width),
            row_bits: bits_for(projector_height),
            inverted: true,
            references: true,
        }
    }

    /// Number of frames in [`Self::sequence`].
    pub fn frame_count(&self) -> usize {
        let per_bit = if self.inverted { 2 } else { 1 };
        let references = if self.references { 2 } else { 0 };
        ((self.column_bits + self.row_bits) * per_bit + references) as usize
    }

    /// Frames in projection order: references, row planes, then column planes.
    pub fn sequence(&self) -> Vec<PatternFrame> {
        let mut frames = Vec::with_capacity(self.frame_count());

        if self.references {
            frames.push(PatternFrame::White);
            frames.push(PatternFrame::Black);
        }

        let planes = [
            (PatternDirection::Horizontal, self.row_bits),
            (PatternDirection::Vertical, self.column_bits),
        ];
        for (direction, bits) in planes {
            for bit in 0..bits {
                frames.push(PatternFrame::Bit { direction, bit, inverted: false });
                if self.inverted {
                    frames.push(PatternFrame::Bit { direction, bit, inverted: true });
                }
            }
        }

        frames
    }

    /// Whether projector pixel `(x, y)` is lit in `frame`.
    pub fn is_lit(&self, frame: PatternFrame, x: u32, y: u32) -> bool {
        match frame {
            PatternFrame::White => true,
            PatternFrame::Black => false,
            PatternFrame::Bit { direction, bit, inverted } => {
                let (coord, bits) = match direction {
                    PatternDirection::Horizontal => (y, self.row_bits),
                    PatternDirection::Vertical => (x, self.column_bits),
                };
                if bit >= bits {
                    return inverted;
                }
                let set = (binary_to_gray(coord) >> (bits - 1 - bit)) & 1 == 1;
                set != inverted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_code_conversion() {
        for i in 0..1024 {
            assert_eq!(gray_to_binary(binary_to_gray(i)), i);
        }
        // Adjacent codes differ by one bit
        for i in 0..1023u32 {
            assert_eq!((binary_to_gray(i) ^ binary_to_gray(i + 1)).count_ones(), 1);
        }
    }

    #[test]
    fn test_bit_counts() {
        let projection = PatternProjection::new(1920, 1080);
        assert_eq!(projection.column_bits, 11);
        assert_eq!(projection.row_bits, 11);
        assert_eq!(projection.frame_count(), 46);

        let exact = PatternProjection::new(1024, 768);
        assert_eq!(exact.column_bits, 10);
        assert_eq!(exact.row_bits, 10);
    }

    #[test]
    fn test_sequence_layout() {
        let mut projection = PatternProjection::new(8, 4);
        projection.inverted = false;
        let sequence = projection.sequence();
        assert_eq!(sequence.len(), projection.frame_count());
        assert_eq!(sequence[0], PatternFrame::White);
        assert_eq!(sequence[1], PatternFrame::Black);
        assert_eq!(
            sequence[2],
            PatternFrame::Bit { direction: PatternDirection::Horizontal, bit: 0, inverted: false }
        );
        assert_eq!(
            sequence.last(),
            Some(&PatternFrame::Bit { direction: PatternDirection::Vertical, bit: 2, inverted: false })
        );
    }

    #[test]
    fn test_lit_pixels_decode_back_to_column() {
        let projection = PatternProjection::new(16, 1);
        for x in 0..16 {
            let mut gray = 0;
            for bit in 0..projection.column_bits {
                let frame = PatternFrame::Bit { direction: PatternDirection::Vertical, bit, inverted: false };
                gray = (gray << 1) | projection.is_lit(frame, x, 0) as u32;

                let inverse = PatternFrame::Bit { direction: PatternDirection::Vertical, bit, inverted: true };
                assert_ne!(projection.is_lit(frame, x, 0), projection.is_lit(inverse, x, 0));
            }
            assert_eq!(gray_to_binary(gray), x);
        }
    }
}
