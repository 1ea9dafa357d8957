//! Bundled case-study inputs.
//!
//! The patent claims a spiro-oxaspiro scaffold whose B5 substituent must be an
//! optionally substituted thiophenyl. The two sample molecules differ only in
//! B5: a thiophene ring (protected) and a pyridazine ring (not protected).

use crate::models::common::Verdict;

/// Query molecule with B5 = pyridazinyl. Expected verdict: NOT PROTECTED.
pub const SAMPLE_QUERY_MOLECULE: &str = "c1ccc([C@]2(CCNCc3ccnnc3)CCOC3(CCCC3)C2)nc1";

/// Query molecule with B5 = thiophenyl. Expected verdict: PROTECTED.
pub const SAMPLE_PROTECTED_MOLECULE: &str = "c1ccc([C@]2(CCNCc3cccs3)CCOC3(CCCC3)C2)nc1";

/// Core Markush structure of the sample patent (Formula IX)
pub const SAMPLE_CORE_MARKUSH: &str =
    "*CN(*)CCC1(*)CC(*)(*)OC2(CCCC2)C1<sep><a>0:B[5]</a><a>3:B[3]</a><a>7:D[1]</a><a>10:R[21]</a><a>11:R[22]</a>";

pub const SAMPLE_PATENT_CLAIM: &str =
    r#"
Claims (36)
-----------
What is claimed is:

1. A compound having a formula of

\begin{molecule}
\caption{C1(*)(*)OC2(CCCC2)CC(*)(CCN(C*)*) C1<sep><a>1:R[21]</a><a>2:R[22]</a><a>11:D[1]</a><a>16:B</a><a>17:B</a>}
\end{molecule}

or a pharmaceutically acceptable salt thereof, wherein:
- R21 and R22 are independently H or CH3;
- D1 is an optionally substituted aryl;
- B3 is H or optionally substituted alkyl; and
- B5 is an optionally substituted thiophenyl.

2. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein D1 is an optionally substituted phenyl or an optionally substituted pyridyl.

3. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein D1 is pyridyl.

4. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein D1 is 2-pyridyl.

5. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein B5 is an optionally substituted thiophenyl selected from the group consisting of

\begin{molecule}
\caption{*c1cccs1}
\end{molecule}

and

\begin{molecule}
\caption{*c1ccsc1}
\end{molecule}

6. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein B5 is

\begin{molecule}
\caption{*C1SC=CC=1<sep><a>0:<dum></a><r>0:R[23]</r><r>0:R[30]</r>}
\end{molecule}

or

\begin{molecule}
\caption{C1=CSC=C(*)C=1<sep><r>0:R[24]</r><r>0:R[30]</r><a>5:<dum></a>}
\end{molecule}

wherein R23, R24, and R30 are each independently H, OH, cycle, aryl, branched or unbranched alkyl alcohol, halo, branched or unbranched alkyl, amide, cyano, alkoxy, haloalkyl, aklylsulfonyl, nitrite, alkylsulfanyl; or R23 and R24 together form an aryl or cycle that is attached to one or more of the atoms of B5.

7. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein B3 is H.

8. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein B3 is methyl.

9. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein B3 is ethyl.

10. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein R21 is H.

11. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein R22 is H.

12. The compound of claim 1, or a pharmaceutically acceptable salt thereof, wherein both R21 and R22 are H.

---

Core Markush Structure (Formula IX):
*CN(*)CCC1(*)CC(*)(*)OC2(CCCC2)C1<sep><a>0:B[5]</a><a>3:B[3]</a><a>7:D[1]</a><a>10:R[21]</a><a>11:R[22]</a>

R-Group Definitions:
- B[5]: optionally substituted thiophenyl
  - Allowed: *c1cccs1, *c1ccsc1 (thiophene derivatives containing sulfur)
  - NOT allowed: pyridazinyl, pyridinyl, or other heteroaryl groups without sulfur
- B[3]: H or optionally substituted alkyl
- D[1]: optionally substituted aryl
  - Includes: phenyl, pyridyl (2-pyridyl specifically mentioned in claim 4)
- R[21]: independently H or CH3
- R[22]: independently H or CH3
"#;

/// Reader-facing explanation of the extended SMILES notation
pub const EXTENDED_SMILES_EXPLANATION: &str =
    r#"## Extended SMILES

Markush structures are written as `SMILES<sep>EXTENSION`.

Example:
`*CN(*)CCC1(*)CC(*)(*)OC2(CCCC2)C1<sep><a>0:B[5]</a><a>3:B[3]</a><a>7:D[1]</a><a>10:R[21]</a><a>11:R[22]</a>`

- `*` marks an R-group attachment point
- `<sep>` separates the SMILES from the extension
- `<a>0:B[5]</a>` maps atom index 0 to the R-group B[5]
- atom indices count attachment points in order of appearance, from 0

Tags:
- `<a>`: atom index to R-group label
- `<r>`: ring index to R-group label
- `<c>`: circle index to R-group label
- `<dum>`: a bare attachment point

Example R-group mapping:
- B5 = `c1ccnnc1` (pyridazine, no sulfur: NOT PROTECTED)
- B5 = `c1cccs1` (thiophene: PROTECTED)
- B3 = `[H][H]`, D1 = `c1ccccn1`, R21 = `[H][H]`, R22 = `[H][H]`
"#;

/// Named sample molecules selectable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMolecule {
    Protected,
    NotProtected,
}

impl SampleMolecule {
    pub fn smiles(&self) -> &'static str {
        match self {
            SampleMolecule::Protected => SAMPLE_PROTECTED_MOLECULE,
            SampleMolecule::NotProtected => SAMPLE_QUERY_MOLECULE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SampleMolecule::Protected => "B5 = thiophenyl (expected: PROTECTED)",
            SampleMolecule::NotProtected => "B5 = pyridazinyl (expected: NOT PROTECTED)",
        }
    }

    /// Verdict the case study is known to produce
    pub fn expected_verdict(&self) -> Verdict {
        match self {
            SampleMolecule::Protected => Verdict::Protected,
            SampleMolecule::NotProtected => Verdict::NotProtected,
        }
    }

    /// Recognise a SMILES string that is one of the samples
    pub fn identify(smiles: &str) -> Option<SampleMolecule> {
        match smiles.trim() {
            SAMPLE_PROTECTED_MOLECULE => Some(SampleMolecule::Protected),
            SAMPLE_QUERY_MOLECULE => Some(SampleMolecule::NotProtected),
            _ => None,
        }
    }
}
