use serde::Serialize;

/// The four macro-nutrient columns a dish carries. Units are caller-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Proteins,
    Fats,
    Carbohydrates,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Proteins,
        Nutrient::Fats,
        Nutrient::Carbohydrates,
    ];

    /// Form field / query parameter stem.
    pub fn as_str(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Proteins => "proteins",
            Nutrient::Fats => "fats",
            Nutrient::Carbohydrates => "carbohydrates",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Proteins => "Proteins",
            Nutrient::Fats => "Fats",
            Nutrient::Carbohydrates => "Carbohydrates",
        }
    }

    fn index(self) -> usize {
        match self {
            Nutrient::Calories => 0,
            Nutrient::Proteins => 1,
            Nutrient::Fats => 2,
            Nutrient::Carbohydrates => 3,
        }
    }
}

/// Optional nutrient values of one dish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Nutrients {
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
}

impl Nutrients {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Proteins => self.proteins,
            Nutrient::Fats => self.fats,
            Nutrient::Carbohydrates => self.carbohydrates,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::Proteins => self.proteins = value,
            Nutrient::Fats => self.fats = value,
            Nutrient::Carbohydrates => self.carbohydrates = value,
        }
    }
}

/// Fixed-size table keyed by [`Nutrient`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerNutrient<T>([T; 4]);

impl<T> PerNutrient<T> {
    pub fn get(&self, nutrient: Nutrient) -> &T {
        &self.0[nutrient.index()]
    }

    pub fn get_mut(&mut self, nutrient: Nutrient) -> &mut T {
        &mut self.0[nutrient.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_round_each_field() {
        let mut n = Nutrients::default();
        for (i, nutrient) in Nutrient::ALL.into_iter().enumerate() {
            n.set(nutrient, Some(i as f64));
        }
        assert_eq!(n.calories, Some(0.0));
        assert_eq!(n.proteins, Some(1.0));
        assert_eq!(n.fats, Some(2.0));
        assert_eq!(n.carbohydrates, Some(3.0));
        assert_eq!(n.get(Nutrient::Fats), Some(2.0));
    }

    #[test]
    fn test_per_nutrient_is_independent() {
        let mut table: PerNutrient<u8> = PerNutrient::default();
        *table.get_mut(Nutrient::Proteins) = 7;
        assert_eq!(*table.get(Nutrient::Proteins), 7);
        assert_eq!(*table.get(Nutrient::Calories), 0);
    }
}
