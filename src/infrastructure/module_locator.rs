use crate::core::interfaces::ModuleLocator;
use crate::core::models::HelperPaths;
use crate::utils::{Logger, PackError, Result};
use std::path::{Path, PathBuf};

/// Resolves a module the way a `require` from lambda-pack's own installation would.
///
/// Walks the `node_modules` directories above the install directory and only
/// accepts a directory that carries a `package.json`, so helpers shipped with
/// lambda-pack win over whatever the consuming project installed.
pub struct InstallationResolver {
    install_dir: PathBuf,
}

impl InstallationResolver {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
        }
    }

    /// Uses the directory holding the running executable.
    pub fn from_current_exe() -> Option<Self> {
        let exe = std::env::current_exe().ok()?;
        let exe = exe.canonicalize().unwrap_or(exe);
        exe.parent().map(Self::new)
    }
}

impl ModuleLocator for InstallationResolver {
    fn name(&self) -> &'static str {
        "installation"
    }

    fn locate(&self, module: &str) -> Option<PathBuf> {
        self.install_dir
            .ancestors()
            .map(|dir| dir.join("node_modules").join(module))
            .find(|candidate| candidate.join("package.json").is_file())
            .map(|found| found.canonicalize().unwrap_or(found))
    }
}

/// Searches upward from a plugins directory for a directory named after the module.
///
/// This is the fallback for linked local-development installs, where the
/// helpers are not reachable from the executable's location.
pub struct AncestorSearch {
    search_root: PathBuf,
}

impl AncestorSearch {
    pub fn new(search_root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: search_root.into(),
        }
    }
}

impl ModuleLocator for AncestorSearch {
    fn name(&self) -> &'static str {
        "ancestor-search"
    }

    fn locate(&self, module: &str) -> Option<PathBuf> {
        for dir in self.search_root.ancestors() {
            for candidate in [dir.join("node_modules").join(module), dir.join(module)] {
                if candidate.is_dir() {
                    return Some(candidate.canonicalize().unwrap_or(candidate));
                }
            }
        }
        None
    }
}

/// Tries each locator in order; the first hit wins.
pub struct LocatorChain {
    locators: Vec<Box<dyn ModuleLocator>>,
    search_root: PathBuf,
}

impl LocatorChain {
    pub fn new(search_root: impl Into<PathBuf>) -> Self {
        Self {
            locators: Vec::new(),
            search_root: search_root.into(),
        }
    }

    /// Installation lookup first, then the upward search from `search_root`.
    pub fn standard(search_root: impl Into<PathBuf>) -> Self {
        let search_root = search_root.into();
        let mut chain = Self::new(search_root.clone());
        if let Some(installation) = InstallationResolver::from_current_exe() {
            chain = chain.with_locator(Box::new(installation));
        }
        chain.with_locator(Box::new(AncestorSearch::new(search_root)))
    }

    pub fn with_locator(mut self, locator: Box<dyn ModuleLocator>) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn locate(&self, module: &str) -> Result<PathBuf> {
        for locator in &self.locators {
            if let Some(path) = locator.locate(module) {
                Logger::helper_located(module, &path, locator.name());
                return Ok(path);
            }
        }
        Err(PackError::not_locatable(module, &self.search_root))
    }

    /// Resolves every module afresh; nothing is cached between builds.
    pub fn locate_all(&self, modules: &[&str]) -> Result<HelperPaths> {
        let mut helpers = HelperPaths::new();
        for module in modules {
            helpers.insert(module.to_string(), self.locate(module)?);
        }
        Ok(helpers)
    }
}

/// Finds the bundler executable next to its located package, then on `PATH`.
pub fn locate_bundler_bin(package_dir: Option<&Path>, bin: &str) -> Result<PathBuf> {
    if let Some(node_modules) = package_dir.and_then(node_modules_of) {
        let shim_dir = node_modules.join(".bin");
        let candidates = if cfg!(windows) {
            vec![shim_dir.join(format!("{}.cmd", bin)), shim_dir.join(bin)]
        } else {
            vec![shim_dir.join(bin)]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.is_file()) {
            return Ok(found);
        }
    }

    which::which(bin).map_err(|_| PackError::BundlerNotFound(bin.to_string()))
}

/// The `node_modules` directory that contains a package, scoped or not.
fn node_modules_of(package_dir: &Path) -> Option<PathBuf> {
    package_dir
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().map(|n| n == "node_modules").unwrap_or(false))
        .map(Path::to_path_buf)
}
