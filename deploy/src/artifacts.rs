use std::{
    fs,
    path::{Path, PathBuf},
};

use ethers::{abi::Abi, types::Bytes, utils::hex};
use serde::Deserialize;
use thiserror::Error;

use crate::utils;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact for contract {name:?} not found under {root:?}, did the compile step run?")]
    NotFound { name: String, root: PathBuf },

    #[error("contract name {name:?} is ambiguous, use one of: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("contract {0} has no bytecode, is it abstract or an interface?")]
    NotDeployable(String),

    #[error("contract {0} needs linked libraries, which are not supported")]
    UnlinkedLibraries(String),

    #[error("bad bytecode in {path:?}: {source}")]
    Bytecode {
        path: PathBuf,
        source: hex::FromHexError,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    source_name: String,
    abi: Abi,
    bytecode: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: PathBuf,
}

/// Compiled contract ready to be handed to a contract factory.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
    path: PathBuf,
}

impl Artifact {
    /// `<sourceName>:<contractName>`, the form explorers and the compiler expect.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// Compiler input and version that produced an artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_long_version: String,
    pub input: serde_json::Value,
}

/// Hardhat build output rooted at `artifacts/`.
#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Looks up a contract either by bare name (`SmartPay`) or fully
    /// qualified name (`contracts/SmartPay.sol:SmartPay`).
    pub fn find(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let path = match name.rsplit_once(':') {
            Some((source, contract)) => {
                let path = self.root.join(source).join(format!("{contract}.json"));
                if !path.is_file() {
                    return Err(self.not_found(name));
                }
                path
            }
            None => {
                let mut matches = Vec::new();
                if self.root.is_dir() {
                    collect(&self.root, &format!("{name}.json"), &mut matches)?;
                }
                log::debug!("artifacts matching {name}: {matches:?}");
                match matches.len() {
                    0 => return Err(self.not_found(name)),
                    1 => matches.remove(0),
                    _ => {
                        let mut candidates = matches
                            .iter()
                            .map(|path| load(path).map(|a| a.fully_qualified_name()))
                            .collect::<Result<Vec<_>, _>>()?;
                        candidates.sort();
                        return Err(ArtifactError::Ambiguous {
                            name: name.to_string(),
                            candidates,
                        });
                    }
                }
            }
        };

        let artifact = load(&path)?;
        log::info!(
            "resolved {} from {:?}",
            artifact.fully_qualified_name(),
            path
        );
        Ok(artifact)
    }

    pub fn build_info(&self, artifact: &Artifact) -> Result<BuildInfo, ArtifactError> {
        let dbg_path = artifact.path.with_extension("dbg.json");
        let dbg: DebugFile = read_json(&dbg_path)?;
        let dir = dbg_path.parent().unwrap_or(&self.root);
        read_json(&dir.join(dbg.build_info))
    }

    fn not_found(&self, name: &str) -> ArtifactError {
        ArtifactError::NotFound {
            name: name.to_string(),
            root: self.root.clone(),
        }
    }
}

fn collect(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<(), ArtifactError> {
    let entries = fs::read_dir(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| ArtifactError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name)
            && dir
                .extension()
                .is_some_and(|ext| ext == "sol")
        {
            out.push(path);
        }
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load(path: &Path) -> Result<Artifact, ArtifactError> {
    let file: ArtifactFile = read_json(path)?;
    let fqn = format!("{}:{}", file.source_name, file.contract_name);

    let code = utils::strip_0x(file.bytecode.trim());
    if code.is_empty() {
        return Err(ArtifactError::NotDeployable(fqn));
    }
    // solc leaves `__$<hash>$__` where a library address goes
    if code.contains('_') {
        return Err(ArtifactError::UnlinkedLibraries(fqn));
    }
    let bytecode = hex::decode(code).map_err(|source| ArtifactError::Bytecode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Artifact {
        contract_name: file.contract_name,
        source_name: file.source_name,
        abi: file.abi,
        bytecode: bytecode.into(),
        path: path.to_path_buf(),
    })
}
