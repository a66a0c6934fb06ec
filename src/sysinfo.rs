use heapless::String as HString;
use raw_cpuid::CpuId;

const MIB: u64 = 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl MemoryInfo {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn total_mib(&self) -> u64 {
        self.total_bytes / MIB
    }

    pub fn free_mib(&self) -> u64 {
        self.free_bytes / MIB
    }

    pub fn used_mib(&self) -> u64 {
        self.used_bytes() / MIB
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuSummary {
    pub vendor: HString<16>,
    pub brand: HString<48>,
    pub family: u8,
    pub model: u8,
    pub stepping: u8,
    pub logical_cores: u8,
}

/// Opaque machine facts for the topbar and the `sysinfo` command.
pub trait SystemInfo {
    fn memory(&self) -> MemoryInfo;
    fn cpu(&self) -> Option<CpuSummary>;
}

/// CPUID-backed info; memory totals come from the frame allocator.
pub struct MachineInfo {
    memory: fn() -> MemoryInfo,
}

impl MachineInfo {
    pub fn new(memory: fn() -> MemoryInfo) -> Self {
        Self { memory }
    }
}

impl SystemInfo for MachineInfo {
    fn memory(&self) -> MemoryInfo {
        (self.memory)()
    }

    fn cpu(&self) -> Option<CpuSummary> {
        let cpuid = CpuId::new();
        let mut summary = CpuSummary::default();
        if let Some(vendor) = cpuid.get_vendor_info() {
            push_trimmed(&mut summary.vendor, vendor.as_str());
        }
        if let Some(brand) = cpuid.get_processor_brand_string() {
            push_trimmed(&mut summary.brand, brand.as_str());
        }
        let features = cpuid.get_feature_info()?;
        summary.family = features.family_id();
        summary.model = features.model_id();
        summary.stepping = features.stepping_id();
        summary.logical_cores = features.max_logical_processor_ids();
        Some(summary)
    }
}

fn push_trimmed<const N: usize>(out: &mut HString<N>, text: &str) {
    for ch in text.trim().chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_memory() -> MemoryInfo {
        MemoryInfo { total_bytes: 512 * MIB, free_bytes: 200 * MIB + 17 }
    }

    #[test]
    fn memory_in_mib() {
        let m = fixed_memory();
        assert_eq!(m.total_mib(), 512);
        assert_eq!(m.free_mib(), 200);
        assert_eq!(m.used_mib(), 311);
    }

    #[test]
    fn machine_info_uses_supplied_memory() {
        let info = MachineInfo::new(fixed_memory);
        assert_eq!(info.memory(), fixed_memory());
    }

    #[test]
    fn trimmed_strings_fit() {
        let mut s: HString<4> = HString::new();
        push_trimmed(&mut s, "  GenuineIntel ");
        assert_eq!(s.as_str(), "Genu");
    }
}
