//! NPC turtles riding lily-pad groups

use super::state::{Npc, Platform, PlatformId, find_platform};

/// True if an NPC sits on the given slot of the given platform
pub fn is_occupied(npcs: &[Npc], platform: PlatformId, slot: u8) -> bool {
    npcs.iter().any(|npc| npc.platform == platform && npc.slot == slot)
}

/// Re-derive NPC positions from their platforms
pub fn refresh_positions(npcs: &mut [Npc], platforms: &[Platform]) {
    for npc in npcs.iter_mut() {
        if let Some(platform) = find_platform(platforms, npc.platform) {
            if platform.group_size().is_some() {
                npc.x = platform.x + npc.slot as f32;
                npc.y = platform.y;
            }
        }
    }
}
