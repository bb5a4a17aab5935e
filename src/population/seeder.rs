use crate::entity::Entity;
use crate::error::Result;
use crate::phenotype::Phenotype;
use crate::rng::RandomNumberGenerator;

use super::Population;

/// Creates the phenotypes of the initial populations.
///
/// Any `FnMut(&mut RandomNumberGenerator) -> P` closure is a seeder.
pub trait EntitySeeder<P: Phenotype>: Send {
    /// Creates one phenotype for the population at `population_index`.
    fn seed(&mut self, population_index: usize, rng: &mut RandomNumberGenerator) -> Result<P>;
}

impl<P, F> EntitySeeder<P> for F
where
    P: Phenotype,
    F: FnMut(&mut RandomNumberGenerator) -> P + Send,
{
    fn seed(&mut self, _population_index: usize, rng: &mut RandomNumberGenerator) -> Result<P> {
        Ok(self(rng))
    }
}

/// Builds the population at `index` with `size` freshly seeded, unevaluated entities.
pub fn seed_population<P: Phenotype>(
    seeder: &mut dyn EntitySeeder<P>,
    index: usize,
    size: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<Population<P>> {
    let mut population = Population::new(index, size);
    for _ in 0..size {
        population.push(Entity::new(seeder.seed(index, rng)?));
    }
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneticError;

    #[derive(Clone, Debug)]
    struct Gene {
        deme: usize,
        value: f64,
    }

    impl Phenotype for Gene {
        fn crossover(&mut self, other: &Self) {
            self.value = other.value;
        }

        fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
            self.value = rng.next_f64();
        }
    }

    struct DemeSeeder;

    impl EntitySeeder<Gene> for DemeSeeder {
        fn seed(&mut self, population_index: usize, rng: &mut RandomNumberGenerator) -> Result<Gene> {
            if population_index > 1 {
                return Err(GeneticError::Configuration("only two demes".to_string()));
            }
            Ok(Gene {
                deme: population_index,
                value: rng.next_f64(),
            })
        }
    }

    #[test]
    fn test_closure_seeder() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut seeder = |rng: &mut RandomNumberGenerator| Gene {
            deme: 0,
            value: rng.next_f64(),
        };

        let population = seed_population(&mut seeder, 0, 5, &mut rng).unwrap();
        assert_eq!(population.len(), 5);
        assert_eq!(population.target_size(), 5);
        assert!(population.iter().all(|e| e.raw_fitness().is_none()));
    }

    #[test]
    fn test_seeder_sees_population_index() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut seeder = DemeSeeder;

        let population = seed_population(&mut seeder, 1, 3, &mut rng).unwrap();
        assert_eq!(population.index(), 1);
        assert!(population.iter().all(|e| e.phenotype().deme == 1));

        assert!(seed_population(&mut seeder, 2, 3, &mut rng).is_err());
    }
}
