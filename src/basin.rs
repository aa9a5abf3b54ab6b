use {
    anyhow::{bail, ensure, Result},
    ndarray::{Array2, Zip},
    serde::{Deserialize, Serialize},
};

/// Ocean region a diagnostic is restricted to
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basin {
    Global,
    Atlantic,
    Pacific,
    Indian,
    IndoPacific,
}

/// Sub-basin masks on the horizontal grid, 1 inside the basin and 0 outside
#[derive(Debug, Clone, PartialEq)]
pub struct BasinMasks {
    pub atlantic: Array2<f64>,
    pub pacific: Array2<f64>,
    pub indian: Array2<f64>,
}

impl BasinMasks {
    pub fn new(atlantic: Array2<f64>, pacific: Array2<f64>, indian: Array2<f64>) -> Result<Self> {
        ensure!(
            atlantic.dim() == pacific.dim() && atlantic.dim() == indian.dim(),
            "basin masks differ in shape: {:?}, {:?}, {:?}",
            atlantic.dim(),
            pacific.dim(),
            indian.dim()
        );

        Ok(BasinMasks {
            atlantic,
            pacific,
            indian,
        })
    }

    /// Masks that only know the global ocean
    pub fn global(shape: (usize, usize)) -> Self {
        BasinMasks {
            atlantic: Array2::zeros(shape),
            pacific: Array2::zeros(shape),
            indian: Array2::zeros(shape),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.atlantic.dim()
    }

    /// Mask of `basin`. A sub-basin whose masks are empty everywhere is an
    /// error, as it happens when the mask files were never loaded.
    pub fn select(&self, basin: Basin) -> Result<Array2<f64>> {
        let mask = match basin {
            Basin::Global => return Ok(Array2::ones(self.dim())),
            Basin::Atlantic => self.atlantic.clone(),
            Basin::Pacific => self.pacific.clone(),
            Basin::Indian => self.indian.clone(),
            Basin::IndoPacific => {
                let mut mask = Array2::zeros(self.dim());
                Zip::from(&mut mask)
                    .and(&self.pacific)
                    .and(&self.indian)
                    .apply(|m, &p, &i| *m = (p + i).min(1.0));
                mask
            }
        };

        if mask.iter().all(|&m| m == 0.0) {
            bail!("{:?} basin mask is empty", basin);
        }

        Ok(mask)
    }
}
