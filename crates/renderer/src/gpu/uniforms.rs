use bytemuck::{Pod, Zeroable};

/// Mirror of the `Params { vec4 buf; }` uniform block.
///
/// `buf.x` and `buf.y` carry the two time channels; `z` and `w` are reserved.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub buf: [f32; 4],
}

impl FrameUniforms {
    pub const SIZE: u64 = std::mem::size_of::<FrameUniforms>() as u64;

    pub fn new(buf: [f32; 4]) -> Self {
        Self { buf }
    }

    pub fn set(&mut self, buf: [f32; 4]) {
        self.buf = buf;
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new([0.5, 1.0, 0.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_std140_vec4() {
        assert_eq!(FrameUniforms::SIZE, 16);
        let uniforms = FrameUniforms::new([0.25, 0.75, 0.0, 0.0]);
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[0..4], &0.25f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &0.75f32.to_ne_bytes());
    }
}
