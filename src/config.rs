use crate::error::AcoError;

/// Configuration for an ACO run.
///
/// Defaults match the classic parameterization: `rho = 0.5`,
/// `alpha = beta = 0.5`, `q = 1.0`, ten ants over ten iterations,
/// 2-opt refinement off.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    pub file_path: Option<String>,
    /// Number of ants constructing tours each iteration.
    pub ant_number: usize,
    /// Number of iterations to execute.
    pub iteration_number: usize,
    pub rho: f64,   // Evaporation rate, must stay in [0, 1)
    pub alpha: f64, // Pheromone influence
    pub beta: f64,  // Heuristic (inverse distance) influence
    pub q: f64,     // Pheromone deposit constant
    /// Run 2-opt local search on every completed tour.
    pub two_opt: bool,
    /// Seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            file_path: None,
            ant_number: 10,
            iteration_number: 10,
            rho: 0.5,
            alpha: 0.5,
            beta: 0.5,
            q: 1.0,
            two_opt: false,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn with_ant_number(mut self, n: usize) -> Self {
        self.ant_number = n;
        self
    }

    pub fn with_iteration_number(mut self, n: usize) -> Self {
        self.iteration_number = n;
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn with_two_opt(mut self, enabled: bool) -> Self {
        self.two_opt = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the parameter domains before any iteration runs.
    pub fn validate(&self) -> Result<(), AcoError> {
        if self.ant_number == 0 {
            return Err(AcoError::InvalidConfiguration(
                "ant_number must be positive".into(),
            ));
        }
        if self.iteration_number == 0 {
            return Err(AcoError::InvalidConfiguration(
                "iteration_number must be positive".into(),
            ));
        }
        if !(self.rho >= 0.0 && self.rho < 1.0) {
            return Err(AcoError::InvalidConfiguration(format!(
                "rho must be in [0, 1), got {}",
                self.rho
            )));
        }
        Ok(())
    }

    pub fn build(mut args: impl Iterator<Item = String>) -> Result<AcoConfig, &'static str> {
        args.next();

        let mut config = AcoConfig::default();
        let mut file_path: Option<String> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-n" | "--ants" => {
                    config.ant_number = args
                        .next()
                        .ok_or("Missing value for --ants")?
                        .parse()
                        .map_err(|_| "Invalid number for --ants")?
                }
                "-i" | "--iters" => {
                    config.iteration_number = args
                        .next()
                        .ok_or("Missing value for --iters")?
                        .parse()
                        .map_err(|_| "Invalid number for --iters")?
                }
                "-r" | "--rho" => {
                    config.rho = args
                        .next()
                        .ok_or("Missing value for --rho")?
                        .parse()
                        .map_err(|_| "Invalid number for --rho")?
                }
                "-a" | "--alpha" => {
                    config.alpha = args
                        .next()
                        .ok_or("Missing value for --alpha")?
                        .parse()
                        .map_err(|_| "Invalid number for --alpha")?
                }
                "-b" | "--beta" => {
                    config.beta = args
                        .next()
                        .ok_or("Missing value for --beta")?
                        .parse()
                        .map_err(|_| "Invalid number for --beta")?
                }
                "-q" | "--q-val" => {
                    config.q = args
                        .next()
                        .ok_or("Missing value for --q-val")?
                        .parse()
                        .map_err(|_| "Invalid number for --q-val")?
                }
                "-o" | "--two-opt" => config.two_opt = true,
                "-s" | "--seed" => {
                    config.seed = Some(
                        args.next()
                            .ok_or("Missing value for --seed")?
                            .parse()
                            .map_err(|_| "Invalid number for --seed")?,
                    )
                }
                _ if file_path.is_none() && !arg.starts_with('-') => file_path = Some(arg),
                _ => return Err("Invalid option or unexpected argument"),
            }
        }
        config.file_path = Some(file_path.ok_or("TSPLIB file path not provided")?);

        Ok(config)
    }
}
