use std::path::Path;

/// where tensor-backed agents place their parameters. detection is a
/// coarse probe for the first NVIDIA character device, gated by the
/// visibility mask so `--cuda ""` always pins evaluation to the CPU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    /// pure selection rule, split out from the probe for testing
    pub fn choose(available: bool, cuda: &str) -> Self {
        if available && !cuda.is_empty() {
            Self::Cuda(0)
        } else {
            Self::Cpu
        }
    }
    /// probe the host for a usable GPU and apply the visibility mask
    pub fn detect(cuda: &str) -> Self {
        Self::choose(Path::new("/dev/nvidia0").exists(), cuda)
    }
    pub fn is_gpu(&self) -> bool {
        matches!(self, Self::Cuda(_))
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_out_gpu_falls_back() {
        assert_eq!(Device::choose(true, ""), Device::Cpu);
        assert_eq!(Device::choose(false, ""), Device::Cpu);
        assert_eq!(Device::choose(false, "0"), Device::Cpu);
        assert_eq!(Device::choose(true, "0"), Device::Cuda(0));
    }

    #[test]
    fn display_names() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda(0).to_string(), "cuda:0");
    }
}
