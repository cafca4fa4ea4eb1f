//! 已知编译目标的元数据（支持等级、说明、产物格式）

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// 伪目标：选中后从 `.cargo/config.toml` 删除 `build.target`，恢复为本机编译
pub const SYSTEM_TARGET: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetTier {
    /// 保证可用
    Supported = 1,
    /// 保证可构建
    Builds = 2,
    /// 无官方支持
    Unsupported = 3,
}

impl TargetTier {
    pub fn label(self) -> &'static str {
        match self {
            TargetTier::Supported => "Tier 1",
            TargetTier::Builds => "Tier 2",
            TargetTier::Unsupported => "Tier 3",
        }
    }
}

impl fmt::Display for TargetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTarget {
    pub tier: Option<TargetTier>,
    pub description: &'static str,
    /// 产物格式（ELF / PE）
    pub file_format: Option<&'static str>,
}

use TargetTier::{Builds, Unsupported};

const ANDROID: &str = "Android is a mobile operating system built on top of the Linux kernel";
const OHOS: &str = "Targets for the OpenHarmony operating system";
const FUCHSIA: &str =
    "Fuchsia is a modern open source operating system that's simple, secure, updatable, and performant";
const SOLID: &str = "SOLID embedded development platform by Kyoto Microcomputer Co., Ltd";
const GNULLVM: &str = "Windows targets similar to *-pc-windows-gnu but using UCRT as the runtime and various LLVM tools/libraries instead of GCC/Binutils";
const QNX: &str = "QNX Neutrino (nto) Real-time operating system. The support has been implemented jointly by Elektrobit Automotive GmbH and Blackberry QNX";
const OPENBSD: &str = "OpenBSD multi-platform 4.4BSD-based UNIX-like operating system";
const UEFI: &str = "Unified Extensible Firmware Interface (UEFI) targets for application, driver, and core UEFI binaries";

type Row = (&'static str, Option<TargetTier>, &'static str, Option<&'static str>);

#[rustfmt::skip]
const TABLE: &[Row] = &[
    (SYSTEM_TARGET, None, "Resets the target to compile for current system", None),
    ("aarch64-apple-ios-sim", Some(Builds), "Apple iOS Simulator for ARM64", None),
    ("arm64_32-apple-watchos", Some(Unsupported), "Apple WatchOS on Arm 64_32", None),
    ("armv7k-apple-watchos", Some(Unsupported), "Apple WatchOS on Arm v7k", None),
    ("aarch64-apple-watchos-sim", Some(Unsupported), "Apple WatchOS Simulator on arm64", None),
    ("x86_64-apple-watchos-sim", Some(Unsupported), "Apple WatchOS Simulator on x86_64", None),
    ("aarch64-nintendo-switch-freestanding", Some(Unsupported), "Nintendo Switch with pure-Rust toolchain", None),
    ("armeb-unknown-linux-gnueabi", Some(Unsupported), "Target for cross-compiling Linux user-mode applications targeting the ARM BE8 architecture", None),
    ("armv4t-none-eabi", Some(Unsupported), "Bare-metal target for any cpu in the ARMv4T architecture family, supporting ARM/Thumb code interworking (aka a32/t32), with ARM code as the default code generation. Particularly Gameboy Advance (GBA)", None),
    ("armv5te-none-eabi", Some(Unsupported), "Bare-metal target for any cpu in the ARMv5TE architecture family, supporting ARM/Thumb code interworking (aka a32/t32), with a32 code as the default code generation", None),
    ("armv6k-nintendo-3ds", Some(Unsupported), "The Nintendo 3DS platform, which has an ARMv6K processor, and its associated operating system (horizon)", None),
    ("armv7-unknown-linux-uclibceabi", Some(Unsupported), "This target supports ARMv7 softfloat CPUs and uses the uclibc-ng standard library. This is a common configuration on many consumer routers (e.g., Netgear R7000, Asus RT-AC68U)", None),
    ("armv7-unknown-linux-uclibceabihf", Some(Unsupported), "This tier supports the ARMv7 processor running a Linux kernel and uClibc-ng standard library. It provides full support for rust and the rust standard library", None),
    ("aarch64-linux-android", Some(Builds), ANDROID, Some("ELF")),
    ("arm-linux-androideabi", Some(Builds), ANDROID, Some("ELF")),
    ("armv7-linux-androideabi", Some(Builds), ANDROID, Some("ELF")),
    ("i686-linux-android", Some(Builds), ANDROID, Some("ELF")),
    ("thumbv7neon-linux-androideabi", Some(Builds), ANDROID, Some("ELF")),
    ("x86_64-linux-android", Some(Builds), ANDROID, Some("ELF")),
    ("aarch64-unknown-linux-ohos", Some(Unsupported), OHOS, Some("ELF")),
    ("armv7-unknown-linux-ohos", Some(Unsupported), OHOS, None),
    ("aarch64-unknown-fuchsia", Some(Builds), FUCHSIA, None),
    ("x86_64-unknown-fuchsia", Some(Builds), FUCHSIA, None),
    ("aarch64-kmc-solid_asp3", Some(Unsupported), SOLID, None),
    ("armv7a-kmc-solid_asp3-eabi", Some(Unsupported), SOLID, None),
    ("armv7a-kmc-solid_asp3-eabihf", Some(Unsupported), SOLID, None),
    ("loongarch64-unknown-linux-gnu", Some(Unsupported), "LoongArch is a new RISC ISA developed by Loongson Technology Corporation Limited", None),
    ("m68k-unknown-linux-gnu", Some(Unsupported), "Motorola 680x0 Linux", None),
    ("mips64-openwrt-linux-musl", Some(Unsupported), "", Some("ELF")),
    ("mipsel-sony-psx", Some(Unsupported), "Sony PlayStation 1 (psx)", None),
    ("nvptx64-nvidia-cuda", Some(Builds), "This is the target meant for deploying code for Nvidia accelerators based on their CUDA platform", None),
    ("riscv32imac-unknown-xous-elf", Some(Unsupported), "Xous microkernel, message-based operating system that powers devices such as Precursor and Betrusted", None),
    ("aarch64-pc-windows-gnullvm", Some(Unsupported), GNULLVM, Some("PE")),
    ("x86_64-pc-windows-gnullvm", Some(Unsupported), GNULLVM, Some("PE")),
    ("aarch64-unknown-nto-qnx710", Some(Unsupported), QNX, None),
    ("i586-pc-nto-qnx700", Some(Unsupported), QNX, None),
    ("x86_64-pc-nto-qnx710", Some(Unsupported), QNX, None),
    ("aarch64-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("i686-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("powerpc64-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("riscv64gc-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("sparc64-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("x86_64-unknown-openbsd", Some(Unsupported), OPENBSD, None),
    ("aarch64-unknown-uefi", Some(Builds), UEFI, None),
    ("i686-unknown-uefi", Some(Builds), UEFI, None),
    ("x86_64-unknown-uefi", Some(Builds), UEFI, None),
    ("wasm64-unknown-unknown", Some(Unsupported), "WebAssembly target which uses 64-bit memories, relying on the memory64 WebAssembly proposal", None),
    ("x86_64-fortanix-unknown-sgx", Some(Builds), "Secure enclaves using Intel Software Guard Extensions (SGX) based on the ABI defined by Fortanix for the Enclave Development Platform (EDP)", None),
    ("x86_64-unknown-none", Some(Builds), "Freestanding/bare-metal x86-64 binaries in ELF format: firmware, kernels, etc", Some("ELF")),
    ("thumbv6m-none-eabi", None, "Cortex M0 and M0+ devices", Some("ELF")),
    ("thumbv7m-none-eabi", None, "Cortex M3 devices", Some("ELF")),
    ("thumbv7em-none-eabi", None, "Cortex M4 and M7 devices. No FPU", Some("ELF")),
    ("thumbv7em-none-eabihf", None, "Cortex M4 and M7 devices. With FPU", Some("ELF")),
];

static KNOWN_TARGETS: LazyLock<HashMap<&'static str, KnownTarget>> = LazyLock::new(|| {
    TABLE
        .iter()
        .map(|&(triple, tier, description, file_format)| {
            (
                triple,
                KnownTarget {
                    tier,
                    description,
                    file_format,
                },
            )
        })
        .collect()
});

pub fn lookup(triple: &str) -> Option<&'static KnownTarget> {
    KNOWN_TARGETS.get(triple)
}

/// 一行展示：`[Tier 2] ELF  说明`，缺失的部分省略
pub fn summary(triple: &str) -> String {
    let Some(target) = lookup(triple) else {
        return String::new();
    };
    let mut parts = Vec::new();
    if let Some(tier) = target.tier {
        parts.push(format!("[{}]", tier));
    }
    if let Some(format) = target.file_format {
        parts.push(format.to_string());
    }
    if !target.description.is_empty() {
        parts.push(target.description.to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicate_triples() {
        assert_eq!(KNOWN_TARGETS.len(), TABLE.len());
    }

    #[test]
    fn system_pseudo_target_is_known() {
        let system = lookup(SYSTEM_TARGET).unwrap();
        assert_eq!(system.tier, None);
    }

    #[test]
    fn fuchsia_targets_are_listed_separately() {
        assert_eq!(lookup("aarch64-unknown-fuchsia").unwrap().tier, Some(TargetTier::Builds));
        assert!(lookup("x86_64-unknown-fuchsia").is_some());
    }

    #[test]
    fn summary_combines_tier_format_and_description() {
        assert_eq!(
            summary("thumbv7m-none-eabi"),
            "ELF Cortex M3 devices"
        );
        assert!(summary("x86_64-linux-android").starts_with("[Tier 2] ELF Android"));
        assert_eq!(summary("x86_64-unknown-linux-gnu"), "");
    }
}
