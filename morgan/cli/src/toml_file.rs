use std::{collections::HashMap, path::Path};

use anyhow::anyhow;
use morgan::{Atom, Bond, InvariantFlags, SimpleGraph};
use serde::Deserialize;

/// The contents of a graph file.  This is parsed directly from the TOML, and then
/// [`lower`](Self::lower)ed into a [`SimpleGraph`].  Like an AST, a `GraphFile` can describe
/// graphs which don't make sense (e.g. bonds to atoms which don't exist), so lowering can fail.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    /// Which attributes should distinguish atoms, unless overridden on the command line
    #[serde(default)]
    invariants: TomlInvariants,
    #[serde(default, rename = "atom")]
    atoms: Vec<TomlAtom>,
    #[serde(default, rename = "bond")]
    bonds: Vec<TomlBond>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlInvariants {
    #[serde(default = "crate::utils::get_true")]
    element: bool,
    #[serde(default)]
    isotope: bool,
    #[serde(default)]
    stereo: bool,
    #[serde(default)]
    hybridization: bool,
    #[serde(default)]
    neighbors: bool,
}

impl Default for TomlInvariants {
    fn default() -> Self {
        Self {
            element: true,
            isotope: false,
            stereo: false,
            hybridization: false,
            neighbors: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlAtom {
    id: u32,
    element: String,
    #[serde(default)]
    charge: i8,
    /// Mass number.  Defaults to the natural isotope mixture.
    isotope: Option<u16>,
    stereo: Option<i8>,
    /// 1 = sp3, 2 = sp2, 3 = sp, 4 = aromatic.  Defaults to sp3.
    #[serde(default = "default_hybridization")]
    hybridization: u8,
    /// Defaults to the number of bonds this atom has in the file
    neighbors: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBond {
    atoms: [u32; 2],
    /// 1, 2, 3 or 4 (aromatic).  Defaults to a single bond.
    #[serde(default = "default_order")]
    order: u8,
    stereo: Option<i8>,
}

impl GraphFile {
    pub fn read_from_file(path: &Path) -> anyhow::Result<Self> {
        let toml_string = crate::utils::read_file_to_string(path)?;
        crate::utils::parse_toml(&toml_string)
    }

    pub fn flags(&self) -> InvariantFlags {
        let TomlInvariants {
            element,
            isotope,
            stereo,
            hybridization,
            neighbors,
        } = self.invariants;
        InvariantFlags {
            element,
            isotope,
            stereo,
            hybridization,
            neighbors,
        }
    }

    /// Convert this file into a [`SimpleGraph`], checking that it makes sense
    pub fn lower(&self) -> anyhow::Result<SimpleGraph<u32>> {
        let mut degrees = HashMap::<u32, usize>::new();
        for bond in &self.bonds {
            for id in bond.atoms {
                *degrees.entry(id).or_default() += 1;
            }
        }

        let mut graph = SimpleGraph::new();
        for atom in &self.atoms {
            if !(1..=4).contains(&atom.hybridization) {
                return Err(anyhow!(
                    "Error in atom {}: hybridization must be 1, 2, 3 or 4",
                    atom.id
                ));
            }
            let neighbors = match atom.neighbors {
                Some(n) => n,
                None => {
                    let degree = degrees.get(&atom.id).copied().unwrap_or(0);
                    u8::try_from(degree)
                        .map_err(|_| anyhow!("Error in atom {}: too many bonds", atom.id))?
                }
            };
            let mut new_atom = Atom::new(atom.element.clone())
                .with_charge(atom.charge)
                .with_hybridization(atom.hybridization)
                .with_neighbors(neighbors);
            new_atom.isotope = atom.isotope;
            new_atom.stereo = atom.stereo;
            graph
                .add_atom(atom.id, new_atom)
                .map_err(|e| anyhow!("Error in atom {}: {}", atom.id, e))?;
        }

        for bond in &self.bonds {
            let [a, b] = bond.atoms;
            if !(1..=4).contains(&bond.order) {
                return Err(anyhow!(
                    "Error in bond {}-{}: order must be 1, 2, 3 or 4",
                    a,
                    b
                ));
            }
            let new_bond = Bond {
                order: bond.order,
                stereo: bond.stereo,
            };
            graph
                .add_bond(a, b, new_bond)
                .map_err(|e| anyhow!("Error in bond {}-{}: {}", a, b, e))?;
        }
        Ok(graph)
    }
}

fn default_hybridization() -> u8 {
    1
}

fn default_order() -> u8 {
    1
}
