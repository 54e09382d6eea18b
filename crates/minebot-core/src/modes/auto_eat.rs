//! Auto-eat mode - keep the hunger bar topped up.

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::items;
use crate::world::ItemStack;

const MAX_FOOD: u32 = 20;
const CRITICAL_FOOD: u32 = 8;

#[derive(Debug, Default)]
pub struct AutoEatState {
    pub eating: bool,
    /// "No food" was announced; cleared once food shows up again
    pub warned_no_food: bool,
}

pub(crate) async fn prepare(ctx: &AgentContext) -> Result<(), CommandError> {
    *ctx.modes.auto_eat.lock().await = AutoEatState::default();
    Ok(())
}

/// Food to eat at hunger level `food`.
///
/// Critical hunger takes the most filling item; otherwise the smallest item
/// that fills the gap, or the most filling one if nothing does.
pub fn choose_food(inventory: &[ItemStack], food: u32) -> Option<(String, u32)> {
    let mut foods: Vec<(String, u32)> = inventory
        .iter()
        .filter_map(|i| items::food_value(&i.name).map(|v| (i.name.clone(), v)))
        .collect();
    foods.sort_by_key(|(_, v)| *v);

    let best = foods.last().cloned();
    if food <= CRITICAL_FOOD {
        return best;
    }
    let missing = MAX_FOOD.saturating_sub(food);
    foods.into_iter().find(|(_, v)| *v >= missing).or(best)
}

/// Equip and consume `item`, tracking the eating flag.
async fn eat(ctx: &AgentContext, item: &str) -> anyhow::Result<()> {
    {
        let mut state = ctx.modes.auto_eat.lock().await;
        if state.eating {
            return Ok(());
        }
        state.eating = true;
    }

    let result = async {
        ctx.world.equip(item).await?;
        ctx.world.consume().await
    }
    .await;

    ctx.modes.auto_eat.lock().await.eating = false;
    result?;
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    if ctx.modes.auto_eat.lock().await.eating {
        return Ok(());
    }
    let food = ctx.world.food().await;
    if food >= ctx.config.auto_eat.threshold {
        return Ok(());
    }

    let inventory = ctx.world.inventory().await;
    let Some((item, value)) = choose_food(&inventory, food) else {
        let mut state = ctx.modes.auto_eat.lock().await;
        if !state.warned_no_food {
            state.warned_no_food = true;
            drop(state);
            ctx.world.chat("Hungry but no food available!").await;
        }
        return Ok(());
    };
    ctx.modes.auto_eat.lock().await.warned_no_food = false;

    tracing::info!(food, item = %item, value, "eating");
    eat(ctx, &item).await
}

/// Eat the most filling food right away.
pub async fn eat_best(ctx: &AgentContext) -> Result<String, CommandError> {
    let inventory = ctx.world.inventory().await;
    let (item, value) = choose_food(&inventory, 0).ok_or(CommandError::NoFood)?;
    ctx.world
        .chat(&format!("Eating {item} (+{value} food)..."))
        .await;
    eat(ctx, &item)
        .await
        .map_err(|e| CommandError::Failed(format!("Failed to eat: {e}")))?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_smallest_sufficient_food_unless_critical() {
        let inv = vec![
            ItemStack::new("cooked_beef", 3),
            ItemStack::new("apple", 5),
            ItemStack::new("melon_slice", 8),
        ];
        assert_eq!(choose_food(&inv, 17).unwrap().0, "apple");
        assert_eq!(choose_food(&inv, 19).unwrap().0, "melon_slice");
        assert_eq!(choose_food(&inv, 6).unwrap().0, "cooked_beef");
        assert_eq!(choose_food(&[ItemStack::new("dirt", 1)], 4), None);
    }
}
