//! External tool names and the flag and suffix conventions shared across
//! the routing layer.

/// IR linker merging bitcode objects into one module.
pub const LLVM_LINK: &str = "llvm-link";

/// Native code generator lowering a merged module to an object file.
pub const LLC: &str = "llc";

/// Compiler driver used by the stock compile and link builders.
pub const CC: &str = "cc";

/// Archiver used by the stock static-library builder.
pub const AR: &str = "ar";

/// Suffix marking IR objects and merged IR modules.
pub const IR_SUFFIX: &str = ".bc";

/// Compile flag requesting IR output instead of native code.
pub const EMIT_IR_FLAG: &str = "-emit-llvm";

/// Code-generator flag for position-independent output, required for
/// shared libraries.
pub const PIC_FLAG: &str = "--relocation-model=pic";

/// Link flags forced on every executable link of a merged module. The
/// linker must tolerate duplicate definitions: independently compiled IR
/// objects can each carry the same inlined symbols after lowering.
pub const PROGRAM_LINK_FLAGS: &[&str] = &[
  "-fuse-ld=lld",
  "-Wl,--gc-sections",
  "-Wl,-allow-multiple-definition",
];

/// Runtime support library linked into every executable.
pub const RUNTIME_SUPPORT_LIB: &str = "stdc++";

/// Default shared-library suffix, used when a target name must be derived.
pub const SHLIB_SUFFIX: &str = ".so";
