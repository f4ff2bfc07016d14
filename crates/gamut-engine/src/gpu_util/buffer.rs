/// Immutable, natively ordered `f32` sequence read from its start.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatBuffer {
    values: Box<[f32]>,
}

impl FloatBuffer {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Copies `values` into a new buffer.
pub fn build_buffer(values: &[f32]) -> FloatBuffer {
    FloatBuffer { values: values.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_input() {
        let src = [-1.0, 1.0, 0.0, 0.25, f32::MAX];
        let buf = build_buffer(&src);
        assert_eq!(buf.as_slice(), &src);
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn empty_input() {
        let buf = build_buffer(&[]);
        assert!(buf.is_empty());
        assert!(buf.as_slice().is_empty());
    }
}
