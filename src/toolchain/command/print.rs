use super::CommandSpec;
use crate::toolchain::types::RenderedCommand;
use std::fmt;
use std::str::FromStr;

/// `rustc --print` 可接受的取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutput {
    CrateName,
    FileNames,
    Sysroot,
    TargetLibdir,
    Cfg,
    CallingConventions,
    TargetList,
    TargetCpus,
    TargetFeatures,
    RelocationModels,
    CodeModels,
    TlsModels,
    TargetSpecJson,
    AllTargetSpecsJson,
    NativeStaticLibs,
    StackProtectorStrategies,
    LinkArgs,
}

impl PrintOutput {
    pub const ALL: [PrintOutput; 17] = [
        PrintOutput::CrateName,
        PrintOutput::FileNames,
        PrintOutput::Sysroot,
        PrintOutput::TargetLibdir,
        PrintOutput::Cfg,
        PrintOutput::CallingConventions,
        PrintOutput::TargetList,
        PrintOutput::TargetCpus,
        PrintOutput::TargetFeatures,
        PrintOutput::RelocationModels,
        PrintOutput::CodeModels,
        PrintOutput::TlsModels,
        PrintOutput::TargetSpecJson,
        PrintOutput::AllTargetSpecsJson,
        PrintOutput::NativeStaticLibs,
        PrintOutput::StackProtectorStrategies,
        PrintOutput::LinkArgs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrintOutput::CrateName => "crate-name",
            PrintOutput::FileNames => "file-names",
            PrintOutput::Sysroot => "sysroot",
            PrintOutput::TargetLibdir => "target-libdir",
            PrintOutput::Cfg => "cfg",
            PrintOutput::CallingConventions => "calling-conventions",
            PrintOutput::TargetList => "target-list",
            PrintOutput::TargetCpus => "target-cpus",
            PrintOutput::TargetFeatures => "target-features",
            PrintOutput::RelocationModels => "relocation-models",
            PrintOutput::CodeModels => "code-models",
            PrintOutput::TlsModels => "tls-models",
            PrintOutput::TargetSpecJson => "target-spec-json",
            PrintOutput::AllTargetSpecsJson => "all-target-specs-json",
            PrintOutput::NativeStaticLibs => "native-static-libs",
            PrintOutput::StackProtectorStrategies => "stack-protector-strategies",
            PrintOutput::LinkArgs => "link-args",
        }
    }
}

impl fmt::Display for PrintOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrintOutput::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("rustc --print 不支持: {}", s))
    }
}

/// 编译器信息查询（`rustc --print <value>`）
#[derive(Debug, Clone, Copy)]
pub struct RustcPrint {
    pub output: PrintOutput,
}

impl RustcPrint {
    pub fn new(output: PrintOutput) -> Self {
        Self { output }
    }
}

impl Default for RustcPrint {
    fn default() -> Self {
        Self::new(PrintOutput::TargetList)
    }
}

impl CommandSpec for RustcPrint {
    fn render(&self) -> RenderedCommand {
        RenderedCommand::new("rustc").flag_value("--print", self.output.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prints_target_list() {
        let cmd = RustcPrint::default().render();
        assert_eq!(cmd.to_string(), "rustc --print target-list");
    }

    #[test]
    fn every_value_parses_back() {
        for output in PrintOutput::ALL {
            assert_eq!(output.as_str().parse::<PrintOutput>(), Ok(output));
        }
        assert!("targets".parse::<PrintOutput>().is_err());
    }
}
