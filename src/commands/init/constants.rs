//! Constants for the init command.

// Install layout, relative to the user's home directory
pub const CONFIG_DIR_NAME: &str = ".dlite";
pub const BIN_DIR_NAME: &str = "bin";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DISK_FILE_NAME: &str = "disk.qcow";
pub const SSH_KEY_NAME: &str = "key";

// Helper tools staged into the bin directory
pub const HYPERKIT_TOOL: &str = "com.docker.hyperkit";
pub const QCOW_TOOL: &str = "qcow-tool";

/// All helper tools, in staging order.
pub const HELPER_TOOLS: &[&str] = &[HYPERKIT_TOOL, QCOW_TOOL];

/// Guest OS release assets downloaded into the config directory.
pub const OS_ASSETS: &[&str] = &["bzImage", "rootfs.cpio.xz"];

// SSH
pub const SSH_KEYGEN: &str = "ssh-keygen";
pub const SSH_KEY_BITS: &str = "2048";
pub const SSH_GUEST_USER: &str = "docker";

/// Address used to discover the host's outbound interface. No packets are sent.
pub const DNS_PROBE_ADDR: &str = "8.8.8.8:53";

// Directory and file modes
pub const DIR_MODE: u32 = 0o755;
pub const EXECUTABLE_MODE: u32 = 0o755;
pub const SSH_DIR_MODE: u32 = 0o700;
pub const SSH_CONFIG_MODE: u32 = 0o600;

// Step labels, in execution order
pub const STEP_SAVE_CONFIG: &str = "Saving configuration";
pub const STEP_SSH_KEYS: &str = "Creating ssh key pair";
pub const STEP_SSH_CONFIG: &str = "Adding host to ssh config";
pub const STEP_TOOLS: &str = "Creating tool binaries";
pub const STEP_DISK: &str = "Creating disk";
pub const STEP_DOWNLOAD: &str = "Downloading OS";

/// Target line width for step output.
pub const STEP_LINE_WIDTH: usize = 60;
